//! Actor, director and genre: single serial key, one join table each.

use super::{ChildTable, ColumnDef, Entity, EntityDef, KeyShape, UpdateStrategy};
use serde::{Deserialize, Serialize};

pub const ACTOR: EntityDef = EntityDef {
    table: "actor",
    path: "actor",
    key: KeyShape::Single("actor_id"),
    columns: &[
        ColumnDef::serial("actor_id"),
        ColumnDef::plain("first_name", "text"),
        ColumnDef::plain("last_name", "text"),
        ColumnDef::plain("gender", "text"),
        ColumnDef::plain("age", "int4"),
        ColumnDef::created_at(),
    ],
    children: &[ChildTable { table: "movie_actor", foreign_key: "actor_id" }],
    update: UpdateStrategy::InPlace,
};

pub const DIRECTOR: EntityDef = EntityDef {
    table: "director",
    path: "director",
    key: KeyShape::Single("director_id"),
    columns: &[
        ColumnDef::serial("director_id"),
        ColumnDef::plain("first_name", "text"),
        ColumnDef::plain("last_name", "text"),
        ColumnDef::created_at(),
    ],
    children: &[ChildTable { table: "movie_director", foreign_key: "director_id" }],
    update: UpdateStrategy::InPlace,
};

pub const GENRE: EntityDef = EntityDef {
    table: "genre",
    path: "genre",
    key: KeyShape::Single("genre_id"),
    columns: &[
        ColumnDef::serial("genre_id"),
        ColumnDef::plain("name", "text"),
        ColumnDef::created_at(),
    ],
    children: &[ChildTable { table: "movie_genre", foreign_key: "genre_id" }],
    update: UpdateStrategy::InPlace,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActorItem {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub age: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectorItem {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenreItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

created_at_field!(ActorItem, DirectorItem, GenreItem);

pub struct Actor;
pub struct Director;
pub struct Genre;

impl Entity for Actor {
    const DEF: &'static EntityDef = &ACTOR;
    type Payload = ActorItem;
    type Id = i64;
}

impl Entity for Director {
    const DEF: &'static EntityDef = &DIRECTOR;
    type Payload = DirectorItem;
    type Id = i64;
}

impl Entity for Genre {
    const DEF: &'static EntityDef = &GENRE;
    type Payload = GenreItem;
    type Id = i64;
}
