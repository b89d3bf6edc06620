use serde::{Deserialize, Deserializer, Serialize};

pub const ONLINE: &str = "online";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Camera {
    /// The remote API uses both numeric and string ids.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rtsp_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Camera {
    /// Only online cameras with a source URL get a stream proxy.
    pub fn is_eligible(&self) -> bool {
        !self.id.is_empty()
            && self.status.as_deref() == Some(ONLINE)
            && self.rtsp_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Camera_{}", self.id),
        }
    }
}

/// `GET /cameras` answers either a bare list or `{ "data": [...] }`.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum CameraList {
    Bare(Vec<Camera>),
    Wrapped { data: Vec<Camera> },
}

impl CameraList {
    pub fn into_vec(self) -> Vec<Camera> {
        match self {
            CameraList::Bare(cameras) => cameras,
            CameraList::Wrapped { data } => data,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Null(()),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Signed(n) => n.to_string(),
        Id::Unsigned(n) => n.to_string(),
        Id::Null(()) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(id: &str, status: Option<&str>, rtsp_url: Option<&str>) -> Camera {
        Camera {
            id: id.to_string(),
            name: None,
            rtsp_url: rtsp_url.map(str::to_string),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn eligibility_needs_online_status_and_url() {
        assert!(camera("camA", Some("online"), Some("rtsp://x")).is_eligible());
        assert!(!camera("camA", Some("offline"), Some("rtsp://x")).is_eligible());
        assert!(!camera("camA", None, Some("rtsp://x")).is_eligible());
        assert!(!camera("camA", Some("online"), Some("")).is_eligible());
        assert!(!camera("camA", Some("online"), None).is_eligible());
        assert!(!camera("", Some("online"), Some("rtsp://x")).is_eligible());
    }

    #[test]
    fn decodes_bare_and_wrapped_lists() {
        let bare: CameraList =
            serde_json::from_str(r#"[{"id":"camA","status":"online","rtsp_url":"rtsp://x"}]"#)
                .unwrap();
        assert_eq!(bare.into_vec()[0].id, "camA");

        let wrapped: CameraList =
            serde_json::from_str(r#"{"success":true,"data":[{"id":7,"name":"Gate"}]}"#).unwrap();
        let cameras = wrapped.into_vec();
        assert_eq!(cameras[0].id, "7");
        assert_eq!(cameras[0].display_name(), "Gate");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let cam = camera("42", Some("online"), Some("rtsp://x"));
        assert_eq!(cam.display_name(), "Camera_42");
    }

    #[test]
    fn null_id_is_empty() {
        let cam: Camera = serde_json::from_str(r#"{"id":null,"status":"online"}"#).unwrap();
        assert!(cam.id.is_empty());
        assert!(!cam.is_eligible());
    }
}
