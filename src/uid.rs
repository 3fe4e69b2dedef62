use chrono::Local;
use rand::Rng;
use uuid::Uuid;

use crate::{config::UUID_UID_ROOT, enums::UidStrategy, error::ReslicerError};

/// Maximum length of a UI value.
pub const MAX_UID_LEN: usize = 64;

pub struct UidGenerator;

impl UidGenerator {
    /// Generate a base identifier for one output series.
    ///
    /// Collisions are not checked; uniqueness rests on UUID entropy or on the
    /// timestamp plus random suffix.
    pub fn generate(strategy: UidStrategy, root: &str) -> String {
        match strategy {
            UidStrategy::Uuid => format!("{UUID_UID_ROOT}{}", Uuid::now_v7().as_u128()),
            UidStrategy::Timestamp => {
                // %-d keeps the first digit of the component non-zero
                let stamp = Local::now().format("%-d%m%Y%H%M%S");
                let suffix: u16 = rand::rng().random_range(0..1000);
                format!("{root}{stamp}{suffix:03}")
            }
        }
    }

    /// Derive the identifier of the slice at `index` from a series base.
    pub fn instance_uid(base: &str, index: usize) -> Result<String, ReslicerError> {
        let uid = format!("{base}.{index}");
        if uid.len() > MAX_UID_LEN {
            return Err(ReslicerError::IdentifierExhaustion(format!(
                "{uid} is longer than {MAX_UID_LEN} characters"
            )));
        }
        Ok(uid)
    }
}
