/// Generate a fresh identifier: `prefix` followed by 24 lowercase hex chars.
///
/// Ids only need to be unique within a process; they carry no meaning
/// beyond correlating blocks and responses in logs.
pub(crate) fn fresh_id(prefix: &str) -> String {
    let hi = u128::from(fastrand::u64(..));
    let lo = u128::from(fastrand::u64(..));
    let mut hex = uuid::Uuid::from_u128((hi << 64) | lo).simple().to_string();
    hex.truncate(24);
    format!("{prefix}{hex}")
}
