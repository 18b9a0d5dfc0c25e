use std::fmt;

use crate::shared::constants::AGE_UNKNOWN;
use crate::shared::face_box::FaceBox;

/// Predicted gender for one face.
///
/// `Unknown` is an explicit not-predicted sentinel, used when a pipeline
/// variant only estimates age.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Location and predictions for one detected face.
///
/// `age` is [`AGE_UNKNOWN`] when the variant does not estimate age; both
/// sentinels are deliberate values rather than missing-data options, since
/// a variant legitimately predicts only one of the two.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceResult {
    pub face_box: FaceBox,
    pub gender: Gender,
    pub age: f32,
}

impl FaceResult {
    /// A result carrying only the face location.
    pub fn unpredicted(face_box: FaceBox) -> Self {
        Self {
            face_box,
            gender: Gender::Unknown,
            age: AGE_UNKNOWN,
        }
    }

    pub fn has_age(&self) -> bool {
        self.age != AGE_UNKNOWN
    }
}

/// All per-face results of one pipeline invocation, in detector order.
pub type ResultSet = Vec<FaceResult>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpredicted_carries_sentinels() {
        let result = FaceResult::unpredicted(FaceBox::new(0, 10, 10, 0));
        assert_eq!(result.gender, Gender::Unknown);
        assert_eq!(result.age, AGE_UNKNOWN);
        assert!(!result.has_age());
    }

    #[test]
    fn test_has_age_for_real_estimate() {
        let result = FaceResult {
            age: 31.5,
            ..FaceResult::unpredicted(FaceBox::new(0, 10, 10, 0))
        };
        assert!(result.has_age());
    }

    #[test]
    fn test_gender_display() {
        assert_eq!(Gender::Male.to_string(), "Male");
        assert_eq!(Gender::Female.to_string(), "Female");
        assert_eq!(Gender::Unknown.to_string(), "Unknown");
    }
}
