use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub struct TestResp {
    #[openapi(json = "code")]
    pub code: i32,
    #[openapi(json = "msg")]
    pub msg: String,
}

#[derive(Debug, Deserialize)]
pub struct PetQuery {
    #[openapi(uri = "id", binding = "required")]
    pub id: u64,
    #[openapi(query = "fields", description = "fields to return")]
    pub fields: Vec<String>,
    #[openapi(header = "X-Tenant")]
    pub tenant: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePet {
    #[openapi(uri = "id", binding = "required")]
    pub id: u64,
    #[openapi(form = "name", binding = "required,max=64", description = "pet name")]
    pub name: String,
    #[openapi(form = "kind", enum = "type:string;values:cat,dog;description:species")]
    pub kind: String,
    #[openapi(form = "photo")]
    pub photo: Option<FileUpload>,
}

#[derive(Debug, Serialize)]
pub struct Pet {
    pub id: u64,
    pub name: String,
    #[serde(rename = "birthDate")]
    pub birth_date: DateTime<Utc>,
    pub owner: Owner,
    pub tags: Vec<String>,
    pub attributes: HashMap<String, serde_json::Value>,
    #[serde(skip)]
    pub internal_note: String,
}

#[derive(Debug, Serialize)]
pub struct Owner {
    pub name: String,
    pub age: u8,
}

#[derive(Debug, Serialize)]
pub struct Category {
    pub name: String,
    pub children: Vec<Category>,
}
