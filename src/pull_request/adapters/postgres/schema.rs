//! Diesel schema for pull request persistence.

diesel::table! {
    /// Pull request records.
    pull_requests (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Title.
        #[max_length = 80]
        title -> Varchar,
        /// Optional description.
        #[max_length = 255]
        description -> Nullable<Varchar>,
        /// Lifecycle state.
        #[max_length = 16]
        status -> Varchar,
        /// Author identity.
        #[max_length = 150]
        author -> Varchar,
        /// Branch merged from.
        #[max_length = 200]
        source_branch -> Varchar,
        /// Branch merged into.
        #[max_length = 200]
        destiny_branch -> Varchar,
        /// Destination head after a successful merge.
        #[max_length = 64]
        merge_commit -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
