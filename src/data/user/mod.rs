use chrono::NaiveDate;
use crypto::bcrypt::bcrypt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::role::Role;
use crate::security::Salt;

pub mod db;

pub static USER_COLLECTION_NAME: &str = "user";

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PasswordHash([u8; 24]);

impl PasswordHash {
    pub fn new(password: impl AsRef<str>, salt: &Salt) -> PasswordHash {
        let mut pw_hash: [u8; 24] = [0; 24];

        let mut sha = Sha256::new();
        Digest::update(&mut sha, password.as_ref().as_bytes());

        bcrypt(10, salt, sha.finalize().as_slice(), &mut pw_hash);

        PasswordHash(pw_hash)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub name: String,
    pub mail_id: String,
    pub pw_hash: PasswordHash,

    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub interests: Vec<String>,

    #[serde(default)]
    pub enrolled_courses: Vec<Uuid>,
    #[serde(default)]
    pub recommended_courses: Vec<Uuid>,

    #[serde(default)]
    pub role: Role,
}

impl User {
    /// Adds a course ref to the enrolled set, returning whether it was new.
    pub fn enroll(&mut self, course: Uuid) -> bool {
        if self.enrolled_courses.contains(&course) {
            return false;
        }
        self.enrolled_courses.push(course);
        true
    }

    /// Drops a course ref from the enrolled set, returning whether it was
    /// present.
    pub fn unenroll(&mut self, course: Uuid) -> bool {
        let before = self.enrolled_courses.len();
        self.enrolled_courses.retain(|it| *it != course);
        self.enrolled_courses.len() != before
    }
}

/// User data safe to hand back to clients; never carries the hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub mail_id: String,
    pub dob: Option<NaiveDate>,
    pub interests: Vec<String>,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            mail_id: user.mail_id,
            dob: user.dob,
            interests: user.interests,
            role: user.role,
        }
    }
}
