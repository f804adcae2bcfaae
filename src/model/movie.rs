use super::{ChildTable, ColumnDef, Entity, EntityDef, KeyShape, UpdateStrategy};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MOVIE: EntityDef = EntityDef {
    table: "movie",
    path: "movie",
    key: KeyShape::Single("movie_id"),
    columns: &[
        ColumnDef::serial("movie_id"),
        ColumnDef::plain("title", "text"),
        ColumnDef::plain("description", "text"),
        ColumnDef::plain("movie_year", "date"),
        ColumnDef::plain("rating", "float8"),
        ColumnDef::plain("runtime", "float8"),
        ColumnDef::plain("votes", "int4"),
        ColumnDef::plain("revenue", "float8"),
        ColumnDef::plain("metascore", "int4"),
        ColumnDef::created_at(),
    ],
    children: &[
        ChildTable { table: "movie_review", foreign_key: "movie_id" },
        ChildTable { table: "movie_actor", foreign_key: "movie_id" },
        ChildTable { table: "movie_genre", foreign_key: "movie_id" },
        ChildTable { table: "movie_director", foreign_key: "movie_id" },
    ],
    update: UpdateStrategy::InPlace,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MovieItem {
    pub title: String,
    pub description: String,
    pub movie_year: NaiveDate,
    pub rating: f64,
    pub runtime: f64,
    pub votes: i64,
    pub revenue: f64,
    pub metascore: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

created_at_field!(MovieItem);

pub struct Movie;

impl Entity for Movie {
    const DEF: &'static EntityDef = &MOVIE;
    type Payload = MovieItem;
    type Id = i64;
}
