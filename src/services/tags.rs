use crate::models::{ParsedAttributes, RawMovieRecord, TagRecord};

/// Joins overview words, genres, keywords, cast and director into one tag.
///
/// Category order only affects readability; vectorization is bag-of-words.
pub fn build_tag(
    overview: &str,
    genres: &[String],
    keywords: &[String],
    cast: &[String],
    director: &[String],
) -> String {
    overview
        .split_whitespace()
        .chain(
            genres
                .iter()
                .chain(keywords)
                .chain(cast)
                .chain(director)
                .map(String::as_str),
        )
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the catalog row for one raw record
pub fn tag_record(record: &RawMovieRecord, max_cast_members: Option<usize>) -> TagRecord {
    let attributes = ParsedAttributes::from_record(record, max_cast_members);
    let tag = build_tag(
        record.overview.as_deref().unwrap_or_default(),
        &attributes.genres,
        &attributes.keywords,
        &attributes.cast,
        &attributes.director,
    );

    TagRecord {
        id: record.id,
        title: record.title.clone(),
        tag,
    }
}
