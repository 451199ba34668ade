use bson::spec::BinarySubtype;
use bson::{doc, Bson, Document};
use uuid::Uuid;

#[inline]
fn uuid_binary(id: Uuid) -> Bson {
    Bson::Binary(bson::Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.as_bytes().to_vec(),
    })
}

#[inline]
pub fn by_id(id: Uuid) -> Document {
    doc! { "_id": uuid_binary(id) }
}

#[inline]
pub fn by_mail(mail_id: &str) -> Document {
    doc! { "mail_id": mail_id }
}

#[inline]
pub fn by_user(user: Uuid) -> Document {
    doc! { "user": uuid_binary(user) }
}

#[inline]
pub fn by_course(course: Uuid) -> Document {
    doc! { "course": uuid_binary(course) }
}

#[inline]
pub fn by_user_and_course(user: Uuid, course: Uuid) -> Document {
    doc! { "user": uuid_binary(user), "course": uuid_binary(course) }
}

#[inline]
pub fn by_user_and_quiz(user: Uuid, quiz: Uuid) -> Document {
    doc! { "user": uuid_binary(user), "quiz": uuid_binary(quiz) }
}
