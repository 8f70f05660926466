//! Version-independent model of experience statements and the documents a
//! record store keeps, with rendering to and from each wire version.

pub mod about;
pub mod activity;
pub mod agent;
pub mod attachment;
pub mod canonical;
pub mod context;
pub mod documents;
pub mod duration;
pub mod error;
pub mod lang;
pub mod object;
pub mod result;
pub mod statement;
pub mod statement_ref;
pub mod statements_result;
pub mod substatement;
pub mod verb;
pub mod version;
pub mod wire;

pub use about::About;
pub use activity::{Activity, ActivityDefinition, InteractionComponent, InteractionComponents};
pub use agent::{Actor, Agent, AgentAccount, Group, Identifier};
pub use attachment::{Attachment, content_digest};
pub use canonical::{VOIDED_VERB, Vocabulary};
pub use context::{Context, ContextActivities};
pub use documents::{ActivityProfile, AgentProfile, Document, DocumentContents, State};
pub use duration::{duration_to_millis, millis_to_duration};
pub use error::{ModelError, ModelResult};
pub use lang::{LanguageMap, language_value, undetermined};
pub use object::StatementObject;
pub use result::{Score, StatementResult};
pub use statement::{Statement, StatementBuilder, timestamp_now};
pub use statement_ref::StatementRef;
pub use statements_result::StatementsResult;
pub use substatement::SubStatement;
pub use verb::Verb;
pub use version::{SUPPORTED_VERSIONS, Version, VersionFamily};
pub use wire::{Extensions, WireEntity, normalize_keys};
