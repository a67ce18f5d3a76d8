//! Concept data types and form types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Data type of a concept.
///
/// Values the designer does not know about are carried through unchanged in
/// [`DataType::Other`]. An empty value means no concept has been chosen yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    #[default]
    Unset,
    Text,
    Numeric,
    Date,
    DateTime,
    Time,
    Duration,
    Coded,
    Image,
    Video,
    Audio,
    File,
    QuestionGroup,
    Subject,
    Location,
    Encounter,
    PhoneNumber,
    Id,
    Notes,
    GroupAffiliation,
    /// Placeholder concept that must be replaced before saving
    NA,
    Other(String),
}

impl DataType {
    pub fn parse(s: &str) -> Self {
        match s {
            "" => Self::Unset,
            "Text" => Self::Text,
            "Numeric" => Self::Numeric,
            "Date" => Self::Date,
            "DateTime" => Self::DateTime,
            "Time" => Self::Time,
            "Duration" => Self::Duration,
            "Coded" => Self::Coded,
            "Image" => Self::Image,
            "Video" => Self::Video,
            "Audio" => Self::Audio,
            "File" => Self::File,
            "QuestionGroup" => Self::QuestionGroup,
            "Subject" => Self::Subject,
            "Location" => Self::Location,
            "Encounter" => Self::Encounter,
            "PhoneNumber" => Self::PhoneNumber,
            "Id" => Self::Id,
            "Notes" => Self::Notes,
            "GroupAffiliation" => Self::GroupAffiliation,
            "NA" => Self::NA,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Unset => "",
            Self::Text => "Text",
            Self::Numeric => "Numeric",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Time => "Time",
            Self::Duration => "Duration",
            Self::Coded => "Coded",
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::File => "File",
            Self::QuestionGroup => "QuestionGroup",
            Self::Subject => "Subject",
            Self::Location => "Location",
            Self::Encounter => "Encounter",
            Self::PhoneNumber => "PhoneNumber",
            Self::Id => "Id",
            Self::Notes => "Notes",
            Self::GroupAffiliation => "GroupAffiliation",
            Self::NA => "NA",
            Self::Other(s) => s,
        }
    }

    /// A concept has been chosen and it is not the NA placeholder
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset | Self::NA)
    }

    /// Types whose form elements carry a single/multi select `type`
    pub fn is_multi_select_capable(&self) -> bool {
        matches!(
            self,
            Self::Coded
                | Self::Subject
                | Self::Encounter
                | Self::Image
                | Self::Video
                | Self::Audio
                | Self::File
        )
    }

    /// Types that accept a `validFormat` regex
    pub fn supports_valid_format(&self) -> bool {
        matches!(self, Self::Text | Self::Numeric)
    }

    /// Types whose elements carry `durationOptions`
    pub fn has_duration_options(&self) -> bool {
        matches!(self, Self::Date | Self::Duration)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}

/// Kind of form, which decides the entity rules are written against
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormType {
    IndividualProfile,
    ProgramEnrolment,
    ProgramExit,
    ProgramEncounter,
    ProgramEncounterCancellation,
    Encounter,
    IndividualEncounterCancellation,
    ChecklistItem,
    SubjectEnrolmentEligibility,
    ManualProgramEnrolmentEligibility,
    Location,
    Task,
    Individual,
    Household,
    Other(String),
}

impl FormType {
    pub fn parse(s: &str) -> Self {
        match s {
            "IndividualProfile" => Self::IndividualProfile,
            "ProgramEnrolment" => Self::ProgramEnrolment,
            "ProgramExit" => Self::ProgramExit,
            "ProgramEncounter" => Self::ProgramEncounter,
            "ProgramEncounterCancellation" => Self::ProgramEncounterCancellation,
            "Encounter" => Self::Encounter,
            "IndividualEncounterCancellation" => Self::IndividualEncounterCancellation,
            "ChecklistItem" => Self::ChecklistItem,
            "SubjectEnrolmentEligibility" => Self::SubjectEnrolmentEligibility,
            "ManualProgramEnrolmentEligibility" => Self::ManualProgramEnrolmentEligibility,
            "Location" => Self::Location,
            "Task" => Self::Task,
            "Individual" => Self::Individual,
            "Household" => Self::Household,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::IndividualProfile => "IndividualProfile",
            Self::ProgramEnrolment => "ProgramEnrolment",
            Self::ProgramExit => "ProgramExit",
            Self::ProgramEncounter => "ProgramEncounter",
            Self::ProgramEncounterCancellation => "ProgramEncounterCancellation",
            Self::Encounter => "Encounter",
            Self::IndividualEncounterCancellation => "IndividualEncounterCancellation",
            Self::ChecklistItem => "ChecklistItem",
            Self::SubjectEnrolmentEligibility => "SubjectEnrolmentEligibility",
            Self::ManualProgramEnrolmentEligibility => "ManualProgramEnrolmentEligibility",
            Self::Location => "Location",
            Self::Task => "Task",
            Self::Individual => "Individual",
            Self::Household => "Household",
            Self::Other(s) => s,
        }
    }

    /// Variable name the generated rule code binds the form's entity to.
    ///
    /// Empty for form types that have no rule entity.
    pub fn rule_entity_name(&self) -> &'static str {
        match self {
            Self::IndividualProfile
            | Self::SubjectEnrolmentEligibility
            | Self::ManualProgramEnrolmentEligibility => "individual",
            Self::ProgramEnrolment | Self::ProgramExit => "programEnrolment",
            Self::ProgramEncounter | Self::ProgramEncounterCancellation => "programEncounter",
            Self::Encounter | Self::IndividualEncounterCancellation => "encounter",
            Self::ChecklistItem => "checklistItem",
            _ => "",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FormType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FormType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| Self::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Coded", DataType::Coded)]
    #[case("QuestionGroup", DataType::QuestionGroup)]
    #[case("", DataType::Unset)]
    #[case("Signature", DataType::Other("Signature".to_string()))]
    fn test_data_type_parse(#[case] raw: &str, #[case] expected: DataType) {
        assert_eq!(DataType::parse(raw), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[test]
    fn test_data_type_null_is_unset() {
        let dt: DataType = serde_json::from_str("null").unwrap();
        assert_eq!(dt, DataType::Unset);
        assert!(!dt.is_set());
        assert!(!DataType::NA.is_set());
    }

    #[rstest]
    #[case(FormType::IndividualProfile, "individual")]
    #[case(FormType::ProgramExit, "programEnrolment")]
    #[case(FormType::ProgramEncounterCancellation, "programEncounter")]
    #[case(FormType::IndividualEncounterCancellation, "encounter")]
    #[case(FormType::Task, "")]
    fn test_rule_entity_name(#[case] form_type: FormType, #[case] expected: &str) {
        assert_eq!(form_type.rule_entity_name(), expected);
    }
}
