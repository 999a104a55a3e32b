//! `hop-route`: walking routes and their turn-by-turn steps.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                   |
//! |------------------|------------------------------------------------------------|
//! | [`step`]         | `Step`, `Maneuver`, `Modifier`, `nearest_step`             |
//! | [`service`]      | `RoutingService` trait, `RouteResponse`, wire decoding     |
//! | [`http`]         | `DirectionsClient` (reqwest), `DirectionsConfig`           |
//! | [`model`]        | `RouteState`, `RouteModel`, `RouteRequest`                 |
//! | [`instructions`] | Step sentences, distance and duration formatting           |
//! | [`error`]        | `RouteError`, `RouteResult<T>`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on steps and route state.  |

pub mod error;
pub mod http;
pub mod instructions;
pub mod model;
pub mod service;
pub mod step;


pub use error::{RouteError, RouteResult};
pub use http::{DirectionsClient, DirectionsConfig};
pub use instructions::{format_distance, format_duration, instruction_text};
pub use model::{RouteModel, RouteRequest, RouteState, WALKING_SPEED_MPS};
pub use service::{decode_directions, RouteResponse, RoutingService};
pub use step::{nearest_step, Maneuver, Modifier, Step};
