#![doc = r#"
HTTP client for learning record stores speaking any supported revision of the
experience API wire format.

Operation mapping:

| Client method | Store resource | Notes |
| --- | --- | --- |
| `Lrs::about` | `GET about` | |
| `Lrs::save_statement` | `PUT statements?statementId=` / `POST statements` | multipart when attachments carry content |
| `Lrs::save_statements` | `POST statements` | empty batch is an input error |
| `Lrs::retrieve_statement` | `GET statements?statementId=` | |
| `Lrs::retrieve_voided_statement` | `GET statements?voidedStatementId=` | `statementId` before 1.0.0 |
| `Lrs::query_statements` | `GET statements` | parameters gated per version before dispatch |
| `Lrs::more_statements` | `GET <more>` | continuation re-rooted on the endpoint |
| `Lrs::retrieve_activity` | `GET activities` | 404 yields a bare activity |
| `Lrs::{retrieve,save,drop}_state`, `Lrs::retrieve_state_ids` | `activities/state` | 404 yields an empty document |
| `Lrs::{retrieve,save,drop}_activity_profile`, `Lrs::retrieve_activity_profile_ids` | `activities/profile` | `If-None-Match: *` without an ETag |
| `Lrs::{retrieve,save,drop}_agent_profile`, `Lrs::retrieve_agent_profile_ids` | `agents/profile` | `actors/profile` at 0.9 |

Implementation notes:
- Every request carries the configured `Authorization` and, except at 0.9, `X-Experience-API-Version`.
- Store-wide extended parameters are merged into every query without overriding caller values.
- `TinCan` fans writes out to every configured store and reads from the first.
- `completion::deliver` adapts any operation to callback delivery.
"#]

pub mod completion;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod launch;
pub mod lrs;
pub mod multipart;
pub mod query;
pub mod testing;
pub mod tincan;
pub mod transport;

pub use completion::deliver;
pub use config::{LrsConfig, StoreSettings, basic_auth};
pub use dispatcher::{Dispatcher, LrsRequest, VERSION_HEADER};
pub use error::{LrsError, LrsResult};
pub use launch::{LaunchParameters, RESERVED_PARAMETERS};
pub use lrs::{Lrs, SaveOptions, StatementWrite, resolve_more_url};
pub use query::{QueryValue, StatementQuery, UNIVERSAL_PARAMETERS, is_supported, supported_parameters};
pub use testing::MockTransport;
pub use tincan::{StateScope, StoreOutcome, TinCan};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
