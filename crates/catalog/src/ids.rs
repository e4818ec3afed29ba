use rand::Rng;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::store::Record;

const ID_BYTES: usize = 8;

/// 16 lowercase hex characters drawn from the thread rng.
pub fn generate_id() -> String {
    let mut bytes = [0u8; ID_BYTES];
    rand::rng().fill(&mut bytes);
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

/// Draws ids until one is not already taken in `records`.
pub fn next_id<T: Record>(records: &[T]) -> String {
    loop {
        let id = generate_id();
        if !records.iter().any(|record| record.id() == id) {
            return id;
        }
    }
}

pub fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
