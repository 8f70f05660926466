use std::fmt;

use serde_json::{Map, Value};

use crate::canonical::Vocabulary;
use crate::error::{ModelError, ModelResult};
use crate::lang::{LanguageMap, language_value};
use crate::version::Version;
use crate::wire::{
    Extensions, WireEntity, WireObject, expect_object, opt_extensions, opt_language_map,
    opt_string,
};

/// One selectable entry of an interaction (a choice, a scale point, a step).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionComponent {
    pub id: Option<String>,
    pub description: Option<LanguageMap>,
}

impl InteractionComponent {
    pub fn new(id: impl Into<String>, description: Option<LanguageMap>) -> Self {
        Self {
            id: Some(id.into()),
            description,
        }
    }
}

impl WireEntity for InteractionComponent {
    fn as_version(&self, _version: Version) -> ModelResult<Value> {
        Ok(WireObject::new()
            .with_opt("id", self.id.clone())
            .with_language_map("description", self.description.as_ref())
            .build())
    }

    fn from_wire(wire: &Value, _version: Version) -> ModelResult<Self> {
        let object = expect_object(wire, "InteractionComponent")?;
        Ok(Self {
            id: opt_string(object, "id"),
            description: opt_language_map(object, "description", "InteractionComponent")?,
        })
    }
}

/// Component lists, selected by `interactionType`. At most one set is ever
/// populated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InteractionComponents {
    #[default]
    None,
    /// `choice` and `sequencing` interactions.
    Choices(Vec<InteractionComponent>),
    /// `likert` interactions.
    Scale(Vec<InteractionComponent>),
    Matching {
        source: Vec<InteractionComponent>,
        target: Vec<InteractionComponent>,
    },
    /// `performance` interactions.
    Steps(Vec<InteractionComponent>),
}

impl InteractionComponents {
    fn read(
        interaction_type: Option<&str>,
        object: &Map<String, Value>,
        version: Version,
    ) -> ModelResult<Self> {
        Ok(match interaction_type {
            Some("choice") | Some("sequencing") => {
                component_list(object, "choices", version)?.map_or(Self::None, Self::Choices)
            }
            Some("likert") => {
                component_list(object, "scale", version)?.map_or(Self::None, Self::Scale)
            }
            Some("matching") => {
                let source = component_list(object, "source", version)?;
                let target = component_list(object, "target", version)?;
                if source.is_none() && target.is_none() {
                    Self::None
                } else {
                    Self::Matching {
                        source: source.unwrap_or_default(),
                        target: target.unwrap_or_default(),
                    }
                }
            }
            Some("performance") => {
                component_list(object, "steps", version)?.map_or(Self::None, Self::Steps)
            }
            _ => Self::None,
        })
    }

    fn write(&self, wire: WireObject, version: Version) -> ModelResult<WireObject> {
        let render = |items: &[InteractionComponent]| {
            items
                .iter()
                .map(|item| item.as_version(version))
                .collect::<ModelResult<Vec<_>>>()
        };
        Ok(match self {
            Self::None => wire,
            Self::Choices(items) => wire.with("choices", render(items)?),
            Self::Scale(items) => wire.with("scale", render(items)?),
            Self::Matching { source, target } => wire
                .with("source", render(source)?)
                .with("target", render(target)?),
            Self::Steps(items) => wire.with("steps", render(items)?),
        })
    }
}

fn component_list(
    object: &Map<String, Value>,
    key: &str,
    version: Version,
) -> ModelResult<Option<Vec<InteractionComponent>>> {
    match object.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| InteractionComponent::from_wire(item, version))
            .collect::<ModelResult<Vec<_>>>()
            .map(Some),
        _ => Ok(None),
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActivityDefinition {
    pub name: Option<LanguageMap>,
    pub description: Option<LanguageMap>,
    /// Always held in long form.
    pub activity_type: Option<String>,
    pub more_info: Option<String>,
    pub extensions: Option<Extensions>,
    pub correct_responses_pattern: Option<Vec<String>>,
    pub interaction_type: Option<String>,
    pub components: InteractionComponents,
}

impl ActivityDefinition {
    pub fn with_type(mut self, activity_type: &str) -> Self {
        self.activity_type = Some(Vocabulary::ActivityType.to_long(activity_type));
        self
    }

    pub fn display_text(&self, lang: Option<&str>) -> &str {
        if let Some(name) = &self.name {
            return language_value(name, lang);
        }
        if let Some(description) = &self.description {
            return language_value(description, lang);
        }
        ""
    }
}

impl WireEntity for ActivityDefinition {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        let activity_type = self.activity_type.as_deref().map(|activity_type| {
            if version.is_legacy() {
                Vocabulary::ActivityType.to_short(activity_type)
            } else {
                activity_type.to_string()
            }
        });
        let mut wire = WireObject::new()
            .with_opt("type", activity_type)
            .with_language_map("name", self.name.as_ref())
            .with_language_map("description", self.description.as_ref())
            .with_opt("interactionType", self.interaction_type.clone())
            .with_opt("correctResponsesPattern", self.correct_responses_pattern.clone())
            .with_extensions("extensions", self.extensions.as_ref());
        wire = self.components.write(wire, version)?;
        if !version.is_legacy() {
            wire = wire.with_opt("moreInfo", self.more_info.clone());
        }
        Ok(wire.build())
    }

    fn from_wire(wire: &Value, version: Version) -> ModelResult<Self> {
        let object = expect_object(wire, "ActivityDefinition")?;
        let interaction_type = opt_string(object, "interactionType");
        let correct_responses_pattern = match object.get("correctResponsesPattern") {
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        };
        Ok(Self {
            name: opt_language_map(object, "name", "ActivityDefinition")?,
            description: opt_language_map(object, "description", "ActivityDefinition")?,
            activity_type: opt_string(object, "type")
                .map(|activity_type| Vocabulary::ActivityType.to_long(&activity_type)),
            more_info: opt_string(object, "moreInfo"),
            extensions: opt_extensions(object, "extensions"),
            correct_responses_pattern,
            components: InteractionComponents::read(interaction_type.as_deref(), object, version)?,
            interaction_type,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Activity {
    pub id: Option<String>,
    pub definition: Option<ActivityDefinition>,
}

impl Activity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            definition: None,
        }
    }

    pub fn with_definition(mut self, definition: ActivityDefinition) -> Self {
        self.definition = Some(definition);
        self
    }

    pub fn display_text(&self, lang: Option<&str>) -> String {
        if let Some(text) = self
            .definition
            .as_ref()
            .map(|definition| definition.display_text(lang))
            .filter(|text| !text.is_empty())
        {
            return text.to_string();
        }
        match &self.id {
            Some(id) => id.clone(),
            None => "Activity: unidentified".to_string(),
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text(None))
    }
}

impl WireEntity for Activity {
    fn as_version(&self, version: Version) -> ModelResult<Value> {
        let definition = self
            .definition
            .as_ref()
            .map(|definition| definition.as_version(version))
            .transpose()?;
        Ok(WireObject::new()
            .with("objectType", "Activity")
            .with_opt("id", self.id.clone())
            .with_opt("definition", definition)
            .build())
    }

    fn from_wire(wire: &Value, version: Version) -> ModelResult<Self> {
        let object = match wire {
            Value::String(id) => return Ok(Self::new(id.clone())),
            other => expect_object(other, "Activity")?,
        };
        if let Some(kind) = object.get("objectType").and_then(Value::as_str) {
            if kind != "Activity" {
                return Err(ModelError::UnknownObjectType(kind.to_string()));
            }
        }
        let definition = match object.get("definition") {
            None | Some(Value::Null) => None,
            Some(definition) => Some(ActivityDefinition::from_wire(definition, version)?),
        };
        Ok(Self {
            id: opt_string(object, "id"),
            definition,
        })
    }
}
