pub mod directory;
pub mod error;
pub mod identity;
pub mod moderation;
pub mod notify;
pub mod ports;
pub mod record;
pub mod registration;
pub mod slug;
pub mod util;
pub mod verification;

#[cfg(test)]
pub mod testing;

pub type DomainResult<T> = Result<T, error::DomainError>;
