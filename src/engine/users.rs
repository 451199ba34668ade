use uuid::Uuid;

use crate::data::store::CatalogStore;
use crate::data::user::db::{UserLoginData, UserPatch, UserSignupData};
use crate::data::user::User;
use crate::error::CoreError;
use crate::security::CredentialVerifier;

use super::Engine;

impl<S: CatalogStore> Engine<S> {
    /// Registers a new user. The password goes through the injected
    /// verifier's hash; mail addresses on the admin list get the admin
    /// role. A mail address can only register once.
    pub async fn register(
        &self,
        signup: UserSignupData,
        verifier: &dyn CredentialVerifier,
        admin_mail_ids: impl AsRef<[String]>,
    ) -> Result<User, CoreError> {
        if self
            .store()
            .find_user_by_mail(&signup.mail_id)
            .await?
            .is_some()
        {
            return Err(CoreError::MailRegistered(signup.mail_id));
        }

        let user = signup.into_user(verifier, admin_mail_ids);
        self.store().save_user(&user).await?;

        tracing::info!(user = %user.id, "registered new user");
        Ok(user)
    }

    /// Checks credentials through the verifier. Unknown mail and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(
        &self,
        login: &UserLoginData,
        verifier: &dyn CredentialVerifier,
    ) -> Result<Option<User>, CoreError> {
        let user = match self.store().find_user_by_mail(&login.mail_id).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        if !verifier.verify(&login.password, &user.pw_hash) {
            return Ok(None);
        }

        Ok(Some(user))
    }

    pub async fn user_details(&self, user_id: Uuid) -> Result<Option<User>, CoreError> {
        Ok(self.store().get_user(user_id).await?)
    }

    /// Partial profile update; a supplied password is re-hashed through
    /// the verifier.
    pub async fn update_user_details(
        &self,
        user_id: Uuid,
        patch: UserPatch,
        verifier: &dyn CredentialVerifier,
    ) -> Result<User, CoreError> {
        let mut user = self.require_user(user_id).await?;

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(mail_id) = patch.mail_id {
            if mail_id != user.mail_id {
                if self.store().find_user_by_mail(&mail_id).await?.is_some() {
                    return Err(CoreError::MailRegistered(mail_id));
                }
                user.mail_id = mail_id;
            }
        }
        if let Some(password) = patch.password {
            user.pw_hash = verifier.hash(&password);
        }
        if let Some(dob) = patch.dob {
            user.dob = Some(dob);
        }
        if let Some(interests) = patch.interests {
            user.interests = interests;
        }

        self.store().save_user(&user).await?;
        Ok(user)
    }

    /// Replaces the user's recommended list. Every referenced course must
    /// exist; IDs are never stored blindly.
    pub async fn set_recommended_courses(
        &self,
        user_id: Uuid,
        course_ids: Vec<Uuid>,
    ) -> Result<User, CoreError> {
        let mut user = self.require_user(user_id).await?;

        for course_id in &course_ids {
            self.require_course(*course_id).await?;
        }

        user.recommended_courses = course_ids;
        self.store().save_user(&user).await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{course, engine, student};
    use crate::role::Role;
    use crate::security::SaltedBcrypt;

    fn verifier() -> SaltedBcrypt {
        SaltedBcrypt::new([3u8; 16])
    }

    fn signup(mail: &str) -> UserSignupData {
        UserSignupData {
            name: "Sam".into(),
            mail_id: mail.to_string(),
            password: "s4mpl3#pass".into(),
            dob: None,
            interests: vec!["systems".into()],
        }
    }

    #[rocket::async_test]
    async fn register_then_login_round_trip() {
        let engine = engine();
        let verifier = verifier();

        let user = engine
            .register(signup("sam@example.com"), &verifier, &[])
            .await
            .unwrap();
        assert_eq!(user.role, Role::Student);

        let login = UserLoginData {
            mail_id: "sam@example.com".into(),
            password: "s4mpl3#pass".into(),
        };
        let found = engine.login(&login, &verifier).await.unwrap().unwrap();
        assert_eq!(found.id, user.id);

        let wrong = UserLoginData {
            mail_id: "sam@example.com".into(),
            password: "not-the-pass".into(),
        };
        assert!(engine.login(&wrong, &verifier).await.unwrap().is_none());

        let unknown = UserLoginData {
            mail_id: "nobody@example.com".into(),
            password: "s4mpl3#pass".into(),
        };
        assert!(engine.login(&unknown, &verifier).await.unwrap().is_none());
    }

    #[rocket::async_test]
    async fn duplicate_mail_is_rejected() {
        let engine = engine();
        let verifier = verifier();

        engine
            .register(signup("dup@example.com"), &verifier, &[])
            .await
            .unwrap();
        let err = engine
            .register(signup("dup@example.com"), &verifier, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::MailRegistered(_)));
    }

    #[rocket::async_test]
    async fn admin_list_grants_admin_role() {
        let engine = engine();
        let verifier = verifier();

        let user = engine
            .register(
                signup("boss@example.com"),
                &verifier,
                &[String::from("boss@example.com")],
            )
            .await
            .unwrap();

        assert_eq!(user.role, Role::Admin);
    }

    #[rocket::async_test]
    async fn patch_rehashes_password_and_keeps_rest() {
        let engine = engine();
        let verifier = verifier();
        let user = engine
            .register(signup("patch@example.com"), &verifier, &[])
            .await
            .unwrap();

        let patched = engine
            .update_user_details(
                user.id,
                UserPatch {
                    password: Some("n3w#secret".into()),
                    interests: Some(vec!["databases".into()]),
                    ..Default::default()
                },
                &verifier,
            )
            .await
            .unwrap();

        assert_eq!(patched.name, "Sam");
        assert_eq!(patched.interests, vec![String::from("databases")]);

        let relogin = UserLoginData {
            mail_id: "patch@example.com".into(),
            password: "n3w#secret".into(),
        };
        assert!(engine.login(&relogin, &verifier).await.unwrap().is_some());
    }

    #[rocket::async_test]
    async fn recommended_courses_must_exist() {
        let engine = engine();
        let user = student(&engine, "recommend").await;
        let real = course(&engine, "rust", 0).await;

        let updated = engine
            .set_recommended_courses(user.id, vec![real.id])
            .await
            .unwrap();
        assert_eq!(updated.recommended_courses, vec![real.id]);

        let err = engine
            .set_recommended_courses(user.id, vec![real.id, Uuid::new_v4()])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "course", .. }));

        let listed = engine.recommended_courses(user.id).await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
