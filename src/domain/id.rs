//! UUID-backed entity identifiers

/// Declares a string newtype holding a canonical (lower-case, hyphenated) UUID.
///
/// The generated type validates on deserialization, so an identifier that
/// made it into a request or a store document is always well-formed.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize, utoipa::ToSchema,
        )]
        #[serde(try_from = "String", into = "String")]
        #[schema(value_type = String, format = Uuid)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random identifier
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Parse an identifier, normalizing it to canonical form
            pub fn parse(value: &str) -> Result<Self, $crate::domain::DomainError> {
                uuid::Uuid::parse_str(value.trim())
                    .map(|uuid| Self(uuid.to_string()))
                    .map_err(|_| {
                        $crate::domain::DomainError::invalid_id(format!(
                            "Invalid {} ID: '{}'",
                            $label, value
                        ))
                    })
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl $crate::domain::storage::StorageKey for $name {
            fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

pub(crate) use uuid_id;

#[cfg(test)]
mod tests {
    use crate::domain::DomainError;

    uuid_id!(SampleId, "sample");

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(SampleId::generate(), SampleId::generate());
    }

    #[test]
    fn test_parse_normalizes_case() {
        let id = SampleId::parse("6F9619FF-8B86-D011-B42D-00C04FC964FF").unwrap();
        assert_eq!(id.as_str(), "6f9619ff-8b86-d011-b42d-00c04fc964ff");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let result = SampleId::parse("not-a-uuid");
        assert!(matches!(result, Err(DomainError::InvalidId { .. })));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<SampleId, _> =
            serde_json::from_str("\"6f9619ff-8b86-d011-b42d-00c04fc964ff\"");
        assert!(ok.is_ok());

        let bad: Result<SampleId, _> = serde_json::from_str("\"123\"");
        assert!(bad.is_err());
    }
}
