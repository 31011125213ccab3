pub mod client;
pub mod credentials;
pub mod types;

pub use client::{mask_params, ClientSettings, QueryParams, TrelloClient, TrelloError};
pub use credentials::Credentials;
pub use types::{Board, BoardList, Card, CardUpdate, NewCard};
