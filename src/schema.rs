diesel::table! {
  user (id) {
    id -> Integer,
    username -> Varchar,
    email -> Varchar,
    password -> Varchar,
    is_staff -> Bool,
    profile_pic -> Nullable<Varchar>,
    description -> Varchar,
    location -> Varchar,
    created_at -> Timestamp,
  }
}

diesel::table! {
  subscription (id) {
    id -> Integer,
    subscriber_id -> Integer,
    target_id -> Integer,
  }
}

diesel::table! {
  tag (id) {
    id -> Integer,
    name -> Varchar,
  }
}

diesel::table! {
  series (id) {
    id -> Integer,
    owner_id -> Integer,
    name -> Varchar,
    description -> Varchar,
    price_cents -> BigInt,
    created_at -> Timestamp,
  }
}

diesel::table! {
  series_tag (id) {
    id -> Integer,
    series_id -> Integer,
    tag_id -> Integer,
  }
}

diesel::table! {
  collection (id) {
    id -> Integer,
    owner_id -> Integer,
    name -> Varchar,
    description -> Varchar,
    cover -> Varchar,
    is_secret -> Bool,
    created_at -> Timestamp,
  }
}

diesel::table! {
  collection_series (id) {
    id -> Integer,
    collection_id -> Integer,
    series_id -> Integer,
  }
}

diesel::table! {
  photo (id) {
    id -> Integer,
    series_id -> Integer,
    owner_id -> Integer,
    file_path -> Varchar,
    position -> Integer,
  }
}

diesel::joinable!(series -> user (owner_id));
diesel::joinable!(series_tag -> series (series_id));
diesel::joinable!(series_tag -> tag (tag_id));
diesel::joinable!(collection -> user (owner_id));
diesel::joinable!(collection_series -> collection (collection_id));
diesel::joinable!(collection_series -> series (series_id));
diesel::joinable!(photo -> series (series_id));
diesel::joinable!(photo -> user (owner_id));

diesel::allow_tables_to_appear_in_same_query!(
  user,
  subscription,
  tag,
  series,
  series_tag,
  collection,
  collection_series,
  photo,
);
