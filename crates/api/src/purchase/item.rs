//! The two purchasable things and the records a purchase produces.

use academy_core::payments::ItemKind;
use academy_core::types::DbId;
use academy_db::models::course::{Course, Enrollment};
use academy_db::models::event::{Event, EventRegistration};
use academy_db::repositories::{CourseRepo, EnrollmentRepo, EventRepo, RegistrationRepo};
use serde::Serialize;
use sqlx::PgPool;

/// A course or an event, as far as the purchase flow is concerned.
#[derive(Debug, Clone)]
pub enum PurchasableItem {
    Course(Course),
    Event(Event),
}

impl PurchasableItem {
    /// Load an item by kind and id regardless of publication state.
    pub async fn load(
        pool: &PgPool,
        kind: ItemKind,
        id: DbId,
    ) -> Result<Option<Self>, sqlx::Error> {
        Ok(match kind {
            ItemKind::Course => CourseRepo::find_by_id(pool, id).await?.map(Self::Course),
            ItemKind::Event => EventRepo::find_by_id(pool, id).await?.map(Self::Event),
        })
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Course(_) => ItemKind::Course,
            Self::Event(_) => ItemKind::Event,
        }
    }

    pub fn id(&self) -> DbId {
        match self {
            Self::Course(c) => c.id,
            Self::Event(e) => e.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Course(c) => &c.title,
            Self::Event(e) => &e.title,
        }
    }

    pub fn price_cents(&self) -> i64 {
        match self {
            Self::Course(c) => c.price_cents,
            Self::Event(e) => e.price_cents,
        }
    }

    pub fn is_free(&self) -> bool {
        self.price_cents() <= 0
    }

    pub fn is_in_person(&self) -> bool {
        match self {
            Self::Course(c) => c.is_in_person,
            Self::Event(e) => e.is_in_person,
        }
    }

    /// The user's active enrollment or non-cancelled registration, if any.
    pub async fn find_active(
        &self,
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<PurchaseRecord>, sqlx::Error> {
        Ok(match self {
            Self::Course(c) => EnrollmentRepo::find_active(pool, user_id, c.id)
                .await?
                .map(PurchaseRecord::Enrollment),
            Self::Event(e) => RegistrationRepo::find_active(pool, user_id, e.id)
                .await?
                .map(PurchaseRecord::Registration),
        })
    }
}

/// What a purchase produces. Serializes as the bare record.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PurchaseRecord {
    Enrollment(Enrollment),
    Registration(EventRegistration),
}

impl PurchaseRecord {
    pub fn id(&self) -> DbId {
        match self {
            Self::Enrollment(e) => e.id,
            Self::Registration(r) => r.id,
        }
    }

    pub fn qr_code(&self) -> Option<&str> {
        match self {
            Self::Enrollment(e) => e.qr_code.as_deref(),
            Self::Registration(r) => r.qr_code.as_deref(),
        }
    }
}
