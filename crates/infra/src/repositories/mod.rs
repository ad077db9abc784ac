mod alumni;

pub use alumni::InMemoryAlumniRepository;
