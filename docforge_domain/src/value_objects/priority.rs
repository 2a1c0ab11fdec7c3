// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Document priority level (§3 `Document`, §4.E `classification`): 1 is
//! highest (bulletins), 5 is lowest.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Priority {
    ServiceBulletin = 1,
    Cpmd = 2,
    ServiceManual = 3,
    PartsCatalog = 4,
    Other = 5,
}

impl Priority {
    /// Priority derived from document type, per §4.E `classification`.
    pub fn for_document_type(document_type: &str) -> Self {
        match document_type {
            "service_bulletin" => Priority::ServiceBulletin,
            "cpmd" => Priority::Cpmd,
            "service_manual" => Priority::ServiceManual,
            "parts_catalog" => Priority::PartsCatalog,
            _ => Priority::Other,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_follows_document_type_table() {
        assert_eq!(Priority::for_document_type("service_bulletin"), Priority::ServiceBulletin);
        assert_eq!(Priority::for_document_type("cpmd"), Priority::Cpmd);
        assert_eq!(Priority::for_document_type("service_manual"), Priority::ServiceManual);
        assert_eq!(Priority::for_document_type("parts_catalog"), Priority::PartsCatalog);
        assert_eq!(Priority::for_document_type("bulletin_x"), Priority::Other);
    }

    #[test]
    fn lower_numeric_value_is_higher_priority() {
        assert!(Priority::ServiceBulletin.as_u8() < Priority::Other.as_u8());
    }
}
