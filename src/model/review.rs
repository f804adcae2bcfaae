use super::{ColumnDef, Entity, EntityDef, KeyShape, UpdateStrategy};
use serde::{Deserialize, Serialize};

/// Addressed by (movie_id, review_id); review_id is the serial surrogate.
pub const MOVIE_REVIEW: EntityDef = EntityDef {
    table: "movie_review",
    path: "movie_review",
    key: KeyShape::Composite("movie_id", "review_id"),
    columns: &[
        ColumnDef::serial("review_id"),
        ColumnDef::plain("movie_id", "int4"),
        ColumnDef::plain("review", "text"),
        ColumnDef::created_at(),
    ],
    children: &[],
    update: UpdateStrategy::InPlace,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MovieReviewItem {
    pub movie_id: i64,
    pub review: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

created_at_field!(MovieReviewItem);

pub struct MovieReview;

impl Entity for MovieReview {
    const DEF: &'static EntityDef = &MOVIE_REVIEW;
    type Payload = MovieReviewItem;
    type Id = (i64, i64);
}
