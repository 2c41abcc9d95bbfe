// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

// Import diesel table macros
use diesel::{allow_tables_to_appear_in_same_query, joinable, table};

table! {
    profiles (id) {
        id -> Integer,
        username -> Varchar,
        display_name -> Varchar,
        bio_text -> Text,
        join_date -> Timestamp,
        profile_image_url -> Nullable<Varchar>,
    }
}

table! {
    posts (id) {
        id -> Integer,
        profile_id -> Integer,
        caption -> Text,
        timestamp -> Timestamp,
    }
}

table! {
    photos (id) {
        id -> Integer,
        post_id -> Integer,
        image_url -> Nullable<Varchar>,
        image_file -> Nullable<Varchar>,
        timestamp -> Timestamp,
    }
}

// Directed edge: follower_id follows followed_id
table! {
    follows (id) {
        id -> Integer,
        follower_id -> Integer,
        followed_id -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    comments (id) {
        id -> Integer,
        post_id -> Integer,
        profile_id -> Integer,
        text -> Text,
        timestamp -> Timestamp,
    }
}

table! {
    likes (id) {
        id -> Integer,
        post_id -> Integer,
        profile_id -> Integer,
        timestamp -> Timestamp,
    }
}

joinable!(posts -> profiles (profile_id));
joinable!(photos -> posts (post_id));
joinable!(comments -> posts (post_id));
joinable!(likes -> posts (post_id));

allow_tables_to_appear_in_same_query!(
    profiles,
    posts,
    photos,
    follows,
    comments,
    likes,
);
