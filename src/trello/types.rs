use serde::{Deserialize, Serialize};

use crate::trello::client::QueryParams;

/// Represents a Trello board
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl Board {
    /// Field selection requested for board lookups
    pub const FIELDS: &'static str = "id,name,url";
}

/// A list (column) on a board
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoardList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub closed: bool,
}

impl BoardList {
    pub const FIELDS: &'static str = "id,name,closed";
}

/// A card within a list
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    pub id_list: String,
    pub id_board: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_labels: Option<Vec<String>>,
}

impl Card {
    /// Field selection for the "my cards" listing
    pub const MEMBER_FIELDS: &'static str = "id,name,idList,idBoard,url";
}

/// Parameters for creating a card.
///
/// Empty optional values are treated as absent and never sent.
#[derive(Debug, Clone, Default)]
pub struct NewCard {
    pub list_id: String,
    pub name: String,
    pub description: Option<String>,
    pub due: Option<String>,
    pub labels: Option<Vec<String>>,
}

impl NewCard {
    pub fn to_params(&self) -> QueryParams {
        let mut params: QueryParams = vec![
            ("idList", self.list_id.clone()),
            ("name", self.name.clone()),
        ];

        if let Some(desc) = self.description.as_deref().filter(|d| !d.is_empty()) {
            params.push(("desc", desc.to_string()));
        }
        if let Some(due) = self.due.as_deref().filter(|d| !d.is_empty()) {
            params.push(("due", due.to_string()));
        }
        if let Some(labels) = self.labels.as_ref().filter(|l| !l.is_empty()) {
            // Trello takes label ids as one comma-separated value
            params.push(("idLabels", labels.join(",")));
        }

        params
    }
}

/// Partial update of a card. Only fields that are `Some` are sent, so an
/// explicit empty value can still be used to clear a field.
#[derive(Debug, Clone, Default)]
pub struct CardUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due: Option<String>,
    pub labels: Option<Vec<String>>,
}

impl CardUpdate {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();

        if let Some(name) = &self.name {
            params.push(("name", name.clone()));
        }
        if let Some(desc) = &self.description {
            params.push(("desc", desc.clone()));
        }
        if let Some(due) = &self.due {
            params.push(("due", due.clone()));
        }
        if let Some(labels) = &self.labels {
            params.push(("idLabels", labels.join(",")));
        }

        params
    }
}
