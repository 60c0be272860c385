use uuid::Uuid;

pub fn user_id() -> String {
    format!("user_{}", Uuid::new_v4().simple())
}

pub fn attendance_id() -> String {
    format!("att_{}", Uuid::new_v4().simple())
}
