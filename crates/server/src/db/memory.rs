//! In-memory storage backend.
//!
//! Mirrors the conflict semantics of the `PostgreSQL` backend (email
//! uniqueness, the (user, course) purchase key, transaction ID uniqueness)
//! behind a single mutex, so the whole service stack can be exercised in
//! tests and local development without a database. `commit_checkout` holds
//! the lock across both writes, giving the same atomicity as the `PostgreSQL`
//! transaction.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use coursehaven_core::{AdminId, CourseId, Email, PaymentId, PurchaseId, UserId};

use super::{
    AdminStore, CheckoutDraft, CheckoutRecord, CheckoutStore, CourseStore, CourseUpdate,
    NewAccount, NewCourse, StoreError, UserStore,
};
use crate::models::{Admin, Course, Payment, Purchase, User};

/// In-memory storage backend.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    admins: Vec<Admin>,
    courses: Vec<Course>,
    purchases: Vec<Purchase>,
    payments: Vec<Payment>,
    purchase_keys: HashSet<(UserId, CourseId)>,
    transaction_ids: HashSet<String>,
    next_id: i32,
}

impl Inner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of all recorded payments (test inspection).
    #[must_use]
    pub fn payments(&self) -> Vec<Payment> {
        self.lock().payments.clone()
    }

    /// Snapshot of all committed purchases (test inspection).
    #[must_use]
    pub fn purchases(&self) -> Vec<Purchase> {
        self.lock().purchases.clone()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewAccount) -> Result<User, StoreError> {
        let mut inner = self.lock();

        if inner.users.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::EmailTaken);
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(inner.next_id()),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());

        Ok(user)
    }

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| &u.email == email).cloned())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn create_admin(&self, new_admin: NewAccount) -> Result<Admin, StoreError> {
        let mut inner = self.lock();

        if inner.admins.iter().any(|a| a.email == new_admin.email) {
            return Err(StoreError::EmailTaken);
        }

        let now = Utc::now();
        let admin = Admin {
            id: AdminId::new(inner.next_id()),
            first_name: new_admin.first_name,
            last_name: new_admin.last_name,
            email: new_admin.email,
            password_hash: new_admin.password_hash,
            created_at: now,
            updated_at: now,
        };
        inner.admins.push(admin.clone());

        Ok(admin)
    }

    async fn admin_by_email(&self, email: &Email) -> Result<Option<Admin>, StoreError> {
        Ok(self
            .lock()
            .admins
            .iter()
            .find(|a| &a.email == email)
            .cloned())
    }

    async fn admin_by_id(&self, id: AdminId) -> Result<Option<Admin>, StoreError> {
        Ok(self.lock().admins.iter().find(|a| a.id == id).cloned())
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn create_course(&self, new_course: NewCourse) -> Result<Course, StoreError> {
        let mut inner = self.lock();

        let now = Utc::now();
        let course = Course {
            id: CourseId::new(inner.next_id()),
            title: new_course.title,
            description: new_course.description,
            price: new_course.price,
            image: new_course.image,
            creator_id: new_course.creator_id,
            created_at: now,
            updated_at: now,
        };
        inner.courses.push(course.clone());

        Ok(course)
    }

    async fn update_course(
        &self,
        id: CourseId,
        editor: AdminId,
        update: CourseUpdate,
    ) -> Result<Course, StoreError> {
        let mut inner = self.lock();

        let course = inner
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound)?;

        if course.creator_id != editor {
            return Err(StoreError::NotOwner);
        }

        course.title = update.title;
        course.description = update.description;
        course.price = update.price;
        course.image = update.image;
        course.updated_at = Utc::now();

        Ok(course.clone())
    }

    async fn delete_course(&self, id: CourseId, editor: AdminId) -> Result<(), StoreError> {
        let mut inner = self.lock();

        let position = inner
            .courses
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::NotFound)?;

        if inner.courses.get(position).is_some_and(|c| c.creator_id != editor) {
            return Err(StoreError::NotOwner);
        }

        inner.courses.remove(position);
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.lock().courses.clone())
    }

    async fn courses_by_ids(&self, ids: &[CourseId]) -> Result<Vec<Course>, StoreError> {
        Ok(self
            .lock()
            .courses
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn course_by_id(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        Ok(self.lock().courses.iter().find(|c| c.id == id).cloned())
    }
}

#[async_trait]
impl CheckoutStore for MemoryStore {
    async fn has_purchased(&self, user: UserId, course: CourseId) -> Result<bool, StoreError> {
        Ok(self.lock().purchase_keys.contains(&(user, course)))
    }

    async fn commit_checkout(&self, draft: CheckoutDraft) -> Result<CheckoutRecord, StoreError> {
        let mut inner = self.lock();

        // Conflict checks first, writes second: holding the lock across both
        // makes the pair atomic, matching the PostgreSQL transaction.
        if inner
            .transaction_ids
            .contains(draft.transaction_id.as_str())
        {
            return Err(StoreError::DuplicateTransactionId);
        }
        if inner
            .purchase_keys
            .contains(&(draft.user_id, draft.course_id))
        {
            return Err(StoreError::DuplicatePurchase);
        }

        let now = Utc::now();
        let payment = Payment {
            id: PaymentId::new(inner.next_id()),
            user_id: draft.user_id,
            course_id: draft.course_id,
            amount: draft.amount,
            card_last_four: draft.card_last_four,
            transaction_id: draft.transaction_id,
            status: draft.status,
            created_at: now,
        };
        let purchase = Purchase {
            id: PurchaseId::new(inner.next_id()),
            user_id: draft.user_id,
            course_id: draft.course_id,
            created_at: now,
        };

        inner
            .transaction_ids
            .insert(payment.transaction_id.as_str().to_owned());
        inner.purchase_keys.insert((purchase.user_id, purchase.course_id));
        inner.payments.push(payment.clone());
        inner.purchases.push(purchase.clone());

        Ok(CheckoutRecord { payment, purchase })
    }

    async fn purchases_for_user(&self, user: UserId) -> Result<Vec<Purchase>, StoreError> {
        Ok(self
            .lock()
            .purchases
            .iter()
            .filter(|p| p.user_id == user)
            .cloned()
            .collect())
    }
}
