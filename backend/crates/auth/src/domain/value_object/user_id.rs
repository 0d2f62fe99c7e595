use kernel::id::Id;

/// Marker for identifiers assigned by the `users` table.
pub struct UserMarker;
pub type UserId = Id<UserMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_i64() {
        let user_id = UserId::from_i64(17);
        assert_eq!(user_id.as_i64(), 17);
        assert_eq!(format!("{user_id:?}"), "Id(17)");
    }
}
