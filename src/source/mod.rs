//! Record sources
//!
//! A record source is an ordered, finite, re-iterable sequence of
//! journalist profiles with stable row indices `0..N`. The partitioner
//! only needs [`RecordSource::count`] and a fresh iterator per pass.

pub mod csv_file;

pub use csv_file::CsvRecordSource;

use crate::error::SourceResult;

/// Field holding the display name
pub const NAME_FIELD: &str = "name";

/// Field holding the opaque identifier
pub const ID_FIELD: &str = "id";

/// Field holding the contact handle
pub const HANDLE_FIELD: &str = "twitter";

/// Field holding the free-text bio
pub const BIO_FIELD: &str = "curr_bio";

/// Column order of the record file
pub const RECORD_FIELDS: [&str; 4] = [NAME_FIELD, ID_FIELD, HANDLE_FIELD, BIO_FIELD];

/// One journalist profile: ordered named string fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create a record from ordered `(field, value)` pairs
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Create a record from anything yielding `(field, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a field value by name
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }

    /// Display name, empty if the field is absent
    pub fn name(&self) -> &str {
        self.get(NAME_FIELD).unwrap_or_default()
    }

    /// Opaque identifier
    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD)
    }

    /// Iterate fields in file order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Iterator over records in index order
pub type RecordIter<'a> = Box<dyn Iterator<Item = SourceResult<Record>> + 'a>;

/// An ordered, finite, re-iterable sequence of records
pub trait RecordSource {
    /// Total number of records
    fn count(&self) -> SourceResult<usize>;

    /// Start a fresh pass over all records from index 0
    fn records(&self) -> SourceResult<RecordIter<'_>>;
}

/// In-memory record source
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<Record>,
}

impl MemorySource {
    /// Create a source over the given records
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Source of `count` synthetic journalists named `journalist-{i}`
    pub fn synthetic(count: usize) -> Self {
        let records = (0..count)
            .map(|i| {
                Record::from_pairs([
                    (NAME_FIELD, format!("journalist-{}", i)),
                    (ID_FIELD, format!("{:024x}", i)),
                    (HANDLE_FIELD, format!("handle{}", i)),
                    (BIO_FIELD, String::new()),
                ])
            })
            .collect();
        Self { records }
    }
}

impl RecordSource for MemorySource {
    fn count(&self) -> SourceResult<usize> {
        Ok(self.records.len())
    }

    fn records(&self) -> SourceResult<RecordIter<'_>> {
        Ok(Box::new(self.records.iter().cloned().map(Ok)))
    }
}
