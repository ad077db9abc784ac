use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::DomainResult;
use crate::error::DomainError;
use crate::notify::{NotificationEvent, dispatch_best_effort};
use crate::ports::alumni::AlumniRepository;
use crate::ports::notify::NotificationDispatcher;
use crate::record::{AlumniCategory, AlumniRecord, Lifecycle};
use crate::slug::slugify;
use crate::util::{now_ms, uuid_v7_without_dashes, verification_token};

const NAME_MAX_LEN: usize = 160;
const BATCH_YEAR_MIN: i32 = 1950;
const BATCH_YEAR_MAX: i32 = 2100;

/// Profile fields accepted at the public registration boundary. Moderation
/// and verification fields are owned by the core and never taken as input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistrationInput {
    pub name: String,
    pub batch_year: i32,
    pub class_section: Option<String>,
    pub house: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub photo_path: Option<String>,
    pub designation: Option<String>,
    pub organization: Option<String>,
    pub category: AlumniCategory,
    pub linkedin_url: Option<String>,
    pub achievements: Option<String>,
    pub story: Option<String>,
    pub memories: Option<String>,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct RegistrationService {
    repository: Arc<dyn AlumniRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl RegistrationService {
    pub fn new(
        repository: Arc<dyn AlumniRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// Creates an `Unverified` record with a fresh single-use token and
    /// raises the verification-requested obligation. Slug collisions are
    /// resolved by suffixing inside the repository and never surface.
    pub async fn register(&self, mut input: RegistrationInput) -> DomainResult<AlumniRecord> {
        input = validate_registration_input(input)?;

        let slug = self.repository.reserve_slug(&slugify(&input.name)).await?;
        let token = verification_token();
        let record = AlumniRecord {
            alumni_id: uuid_v7_without_dashes(),
            slug,
            name: input.name,
            batch_year: input.batch_year,
            class_section: input.class_section,
            house: input.house,
            email: input.email,
            phone: input.phone,
            location: input.location,
            photo_path: input.photo_path,
            designation: input.designation,
            organization: input.organization,
            category: input.category,
            linkedin_url: input.linkedin_url,
            achievements: input.achievements,
            story: input.story,
            memories: input.memories,
            message: input.message,
            is_featured: false,
            is_active: true,
            lifecycle: Lifecycle::Unverified {
                verification_token: token.clone(),
            },
            created_at_ms: now_ms(),
        };

        let record = self.repository.insert(&record).await?;
        tracing::info!(
            alumni_id = %record.alumni_id,
            slug = %record.slug,
            "alumni registration created, awaiting email verification"
        );

        dispatch_best_effort(
            &self.dispatcher,
            NotificationEvent::verification_requested(&record, &token),
        )
        .await;
        Ok(record)
    }
}

fn validate_registration_input(mut input: RegistrationInput) -> DomainResult<RegistrationInput> {
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(DomainError::Validation("name is required".into()));
    }
    if input.name.len() > NAME_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "name exceeds {NAME_MAX_LEN} characters"
        )));
    }
    input.email = input.email.trim().to_string();
    if !is_plausible_email(&input.email) {
        return Err(DomainError::Validation("email is malformed".into()));
    }
    if !(BATCH_YEAR_MIN..=BATCH_YEAR_MAX).contains(&input.batch_year) {
        return Err(DomainError::Validation(format!(
            "batch_year must be between {BATCH_YEAR_MIN} and {BATCH_YEAR_MAX}"
        )));
    }
    Ok(input)
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ApprovalStatus;
    use crate::testing::{InMemoryAlumniStore, RecordingDispatcher};

    fn input(name: &str) -> RegistrationInput {
        RegistrationInput {
            name: name.to_string(),
            batch_year: 2004,
            class_section: Some("XII-A".to_string()),
            house: None,
            email: "amit@example.com".to_string(),
            phone: None,
            location: None,
            photo_path: None,
            designation: None,
            organization: None,
            category: AlumniCategory::Engineering,
            linkedin_url: None,
            achievements: None,
            story: None,
            memories: None,
            message: None,
        }
    }

    fn service() -> (
        RegistrationService,
        Arc<InMemoryAlumniStore>,
        Arc<RecordingDispatcher>,
    ) {
        let store = Arc::new(InMemoryAlumniStore::default());
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let service = RegistrationService::new(store.clone(), dispatcher.clone());
        (service, store, dispatcher)
    }

    #[tokio::test]
    async fn register_creates_unverified_pending_record_with_token() {
        let (service, _, dispatcher) = service();
        let record = service.register(input("Amit Sharma")).await.expect("register");

        assert_eq!(record.slug, "amit-sharma");
        assert_eq!(record.approval_status(), ApprovalStatus::Pending);
        assert!(!record.is_email_verified());
        let token = record.verification_token().expect("token").to_string();
        assert_eq!(token.len(), 64);

        let events = dispatcher.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "verification_requested");
        match &events[0] {
            NotificationEvent::VerificationRequested { token: sent, .. } => {
                assert_eq!(sent, &token);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_names_yield_suffixed_slugs() {
        let (service, _, _) = service();
        let first = service.register(input("Amit Sharma")).await.expect("first");
        let second = service.register(input("Amit Sharma")).await.expect("second");
        assert_eq!(first.slug, "amit-sharma");
        assert_eq!(second.slug, "amit-sharma-1");
    }

    #[tokio::test]
    async fn register_rejects_malformed_email() {
        let (service, _, dispatcher) = service();
        let mut bad = input("Amit Sharma");
        bad.email = "not-an-email".to_string();
        let err = service.register(bad).await.expect_err("validation");
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(dispatcher.events().await.is_empty());
    }

    #[tokio::test]
    async fn register_rejects_blank_name_and_bad_year() {
        let (service, _, _) = service();
        let mut blank = input("   ");
        blank.name = "   ".to_string();
        assert!(matches!(
            service.register(blank).await,
            Err(DomainError::Validation(_))
        ));

        let mut ancient = input("Amit Sharma");
        ancient.batch_year = 1800;
        assert!(matches!(
            service.register(ancient).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn dispatch_failure_does_not_fail_registration() {
        let store = Arc::new(InMemoryAlumniStore::default());
        let dispatcher = Arc::new(RecordingDispatcher::failing());
        let service = RegistrationService::new(store.clone(), dispatcher.clone());

        let record = service.register(input("Amit Sharma")).await.expect("register");
        // Delivery was attempted once, failed, and nothing was recorded.
        assert_eq!(dispatcher.attempts(), 1);
        assert!(dispatcher.events().await.is_empty());
        // The token must stay valid even though the email bounced.
        let stored = store
            .get(&record.alumni_id)
            .await
            .expect("get")
            .expect("record");
        assert!(stored.verification_token().is_some());
    }
}
