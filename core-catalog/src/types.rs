//! Catalog data types
//!
//! Domain values returned by the catalog traits plus the raw response shapes
//! of the IMatch web service.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Catalog file identifier
pub type FileId = u64;

/// Attribute instance managed by this tool. Only one instance per file and set.
pub const ATTRIBUTE_INSTANCE: u32 = 1;

/// File details as returned by `GET /v1/files`.
///
/// Every field except the identifiers is optional on the wire; missing text
/// tags arrive as `None` and are treated as empty by consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(default)]
    pub id: Option<FileId>,

    /// Full path of the file on disk
    #[serde(default, alias = "filename")]
    pub file_name: Option<String>,

    /// File name without folder
    #[serde(default)]
    pub name: Option<String>,

    /// Size in bytes
    #[serde(default)]
    pub size: u64,

    /// Capture date, `YYYY-MM-DDTHH:MM:SS`
    #[serde(default, alias = "datetime")]
    pub date_time: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "keyword_list")]
    pub keywords: Vec<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub camera: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub lens: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub aperture: Option<String>,

    #[serde(default, alias = "shutterspeed", deserialize_with = "lenient_string")]
    pub shutter_speed: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub iso: Option<String>,

    #[serde(default, alias = "focallength", deserialize_with = "lenient_string")]
    pub focal_length: Option<String>,
}

/// Fields requested from `GET /v1/files`.
pub const FILE_FIELDS: &str = "id,filename,name,size,datetime";

/// Tag fields requested from `GET /v1/files`.
pub const FILE_TAG_FIELDS: &str =
    "title,description,keywords,camera,lens,aperture,shutterspeed,iso,focallength";

/// One category a file belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Full `|`-separated category path
    pub path: String,

    /// Category description; carries platform codes such as album ids
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

impl CategoryEntry {
    pub fn new(path: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            path: path.into(),
            description: description.map(str::to_string),
        }
    }
}

/// One attribute instance of a set, flattened from the wire shape.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRecord {
    pub file_id: FileId,
    pub instance_id: u32,
    /// Attribute values keyed by attribute name (no `instanceId`)
    pub data: Map<String, Value>,
}

impl AttributeRecord {
    /// String value of an attribute, if present and non-empty.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// The operation chosen by an attribute write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOp {
    Add,
    Update,
}

impl AttributeOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeOp::Add => "add",
            AttributeOp::Update => "update",
        }
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct AuthenticateResponse {
    pub auth_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttributesResponse {
    #[serde(default)]
    pub result: Vec<AttributeFile>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttributeFile {
    pub id: FileId,
    #[serde(default)]
    pub data: Vec<Map<String, Value>>,
}

impl AttributesResponse {
    /// Flatten `{result: [{id, data: [instance..]}]}` into one record per instance.
    pub fn into_records(self) -> Vec<AttributeRecord> {
        self.result
            .into_iter()
            .flat_map(|file| {
                let file_id = file.id;
                file.data.into_iter().map(move |mut data| {
                    let instance_id = data
                        .remove("instanceId")
                        .and_then(|v| v.as_u64())
                        .and_then(|v| u32::try_from(v).ok())
                        .unwrap_or(ATTRIBUTE_INSTANCE);
                    AttributeRecord {
                        file_id,
                        instance_id,
                        data,
                    }
                })
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AttributeTask<'a> {
    pub op: &'static str,
    pub instanceid: [u32; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WriteResponse {
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoriesResponse {
    #[serde(default)]
    pub categories: Vec<CategoryFiles>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryFiles {
    #[serde(default)]
    pub files: Vec<FileId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FilesResponse {
    #[serde(default)]
    pub files: Vec<FileRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileCategoriesResponse {
    #[serde(default)]
    pub files: Vec<FileCategories>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileCategories {
    pub id: FileId,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelationsResponse {
    #[serde(default)]
    pub files: Vec<RelationFile>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelationFile {
    #[serde(default)]
    pub masters: Vec<RelationGroup>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelationGroup {
    #[serde(default)]
    pub files: Vec<RelationTarget>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelationTarget {
    pub id: FileId,
}

impl RelationsResponse {
    /// First master of the first file, if the file has one.
    pub fn first_master(&self) -> Option<FileId> {
        self.files
            .first()?
            .masters
            .first()?
            .files
            .first()
            .map(|target| target.id)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AppVarResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: Option<String>,
}

/// Accept strings, numbers and booleans; map null and empty to `None`.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Keywords arrive either as an array or as one comma-separated string.
fn keyword_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let keywords = match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s.split(',').map(|k| k.trim().to_string()).collect(),
        _ => Vec::new(),
    };
    Ok(keywords.into_iter().filter(|k: &String| !k.is_empty()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_record_deserialization() {
        let json = r#"{
            "id": 312,
            "fileName": "D:\\Photos\\sunset.jpg",
            "name": "sunset.jpg",
            "size": 2048,
            "dateTime": "2023-05-01T19:20:30",
            "title": "Sunset",
            "description": "",
            "keywords": ["sea", "sky"],
            "aperture": 8,
            "iso": "200"
        }"#;

        let record: FileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, Some(312));
        assert_eq!(record.file_name.as_deref(), Some("D:\\Photos\\sunset.jpg"));
        assert_eq!(record.title.as_deref(), Some("Sunset"));
        assert_eq!(record.description, None);
        assert_eq!(record.keywords, vec!["sea", "sky"]);
        assert_eq!(record.aperture.as_deref(), Some("8"));
        assert_eq!(record.iso.as_deref(), Some("200"));
        assert_eq!(record.camera, None);
    }

    #[test]
    fn test_file_record_without_identity() {
        let record: FileRecord = serde_json::from_str(r#"{"name": "x.jpg"}"#).unwrap();
        assert_eq!(record.id, None);
        assert_eq!(record.file_name, None);
        assert_eq!(record.size, 0);
    }

    #[test]
    fn test_keywords_from_comma_string() {
        let record: FileRecord =
            serde_json::from_str(r#"{"keywords": "sea, sky,,birds"}"#).unwrap();
        assert_eq!(record.keywords, vec!["sea", "sky", "birds"]);
    }

    #[test]
    fn test_attributes_flatten() {
        let json = r#"{"result": [
            {"id": 10, "data": [{"instanceId": 1, "posted": "2023-01-02", "photo_id": "99"}]},
            {"id": 11, "data": []}
        ]}"#;

        let response: AttributesResponse = serde_json::from_str(json).unwrap();
        let records = response.into_records();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_id, 10);
        assert_eq!(records[0].instance_id, 1);
        assert_eq!(records[0].get_str("photo_id"), Some("99"));
        assert!(!records[0].data.contains_key("instanceId"));
    }

    #[test]
    fn test_first_master() {
        let json = r#"{"files": [{"id": 5, "masters": [{"files": [{"id": 4}]}]}]}"#;
        let response: RelationsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.first_master(), Some(4));

        let none: RelationsResponse =
            serde_json::from_str(r#"{"files": [{"id": 5, "masters": []}]}"#).unwrap();
        assert_eq!(none.first_master(), None);
    }

    #[test]
    fn test_attribute_task_serialization() {
        let mut data = Map::new();
        data.insert("photo_id".into(), Value::String("1".into()));
        let tasks = [AttributeTask {
            op: AttributeOp::Add.as_str(),
            instanceid: [ATTRIBUTE_INSTANCE],
            data: Some(&data),
        }];

        let json = serde_json::to_string(&tasks).unwrap();
        assert_eq!(
            json,
            r#"[{"op":"add","instanceid":[1],"data":{"photo_id":"1"}}]"#
        );
    }
}
