//! Long/short vocabulary tables for the oldest wire revision.
//!
//! The tables are closed over the ADL identifiers the oldest revision allowed.
//! Identifiers outside them pass through unchanged in both directions.

const VERB_FORMS: &[(&str, &str)] = &[
    ("http://adlnet.gov/expapi/verbs/experienced", "experienced"),
    ("http://adlnet.gov/expapi/verbs/attended", "attended"),
    ("http://adlnet.gov/expapi/verbs/attempted", "attempted"),
    ("http://adlnet.gov/expapi/verbs/completed", "completed"),
    ("http://adlnet.gov/expapi/verbs/passed", "passed"),
    ("http://adlnet.gov/expapi/verbs/failed", "failed"),
    ("http://adlnet.gov/expapi/verbs/answered", "answered"),
    ("http://adlnet.gov/expapi/verbs/interacted", "interacted"),
    ("http://adlnet.gov/expapi/verbs/imported", "imported"),
    ("http://adlnet.gov/expapi/verbs/created", "created"),
    ("http://adlnet.gov/expapi/verbs/shared", "shared"),
    ("http://adlnet.gov/expapi/verbs/voided", "voided"),
];

const ACTIVITY_TYPE_FORMS: &[(&str, &str)] = &[
    ("http://adlnet.gov/expapi/activities/course", "course"),
    ("http://adlnet.gov/expapi/activities/module", "module"),
    ("http://adlnet.gov/expapi/activities/meeting", "meeting"),
    ("http://adlnet.gov/expapi/activities/media", "media"),
    ("http://adlnet.gov/expapi/activities/performance", "performance"),
    ("http://adlnet.gov/expapi/activities/simulation", "simulation"),
    ("http://adlnet.gov/expapi/activities/assessment", "assessment"),
    ("http://adlnet.gov/expapi/activities/interaction", "interaction"),
    ("http://adlnet.gov/expapi/activities/cmi.interaction", "cmi.interaction"),
    ("http://adlnet.gov/expapi/activities/question", "question"),
    ("http://adlnet.gov/expapi/activities/objective", "objective"),
    ("http://adlnet.gov/expapi/activities/link", "link"),
];

pub const VOIDED_VERB: &str = "http://adlnet.gov/expapi/verbs/voided";

/// Which vocabulary an identifier belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vocabulary {
    Verb,
    ActivityType,
}

impl Vocabulary {
    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Verb => VERB_FORMS,
            Self::ActivityType => ACTIVITY_TYPE_FORMS,
        }
    }

    /// Short form of a long identifier, if it is in the table.
    pub fn short_form(self, long: &str) -> Option<&'static str> {
        self.table()
            .iter()
            .find(|(candidate, _)| *candidate == long)
            .map(|(_, short)| *short)
    }

    /// Long form of a short identifier, if it is in the table.
    pub fn long_form(self, short: &str) -> Option<&'static str> {
        self.table()
            .iter()
            .find(|(_, candidate)| *candidate == short)
            .map(|(long, _)| *long)
    }

    pub fn to_short(self, id: &str) -> String {
        self.short_form(id).unwrap_or(id).to_string()
    }

    pub fn to_long(self, id: &str) -> String {
        self.long_form(id).unwrap_or(id).to_string()
    }

    pub fn short_forms(self) -> impl Iterator<Item = &'static str> {
        self.table().iter().map(|(_, short)| *short)
    }
}
