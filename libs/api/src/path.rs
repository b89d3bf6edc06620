pub const HEALTH: &str = "/health";
pub const PROCESS: &str = "/process";
pub const SYNC: &str = "/sync";

pub const SEGMENTS: &str = "/segmentos";

pub fn cameras(api: &str) -> String {
    format!("{}/cameras", api.trim_end_matches('/'))
}

/// Media server control API, `{base}/index/api/{method}`.
pub mod mediakit {
    pub const GET_SERVER_CONFIG: &str = "getServerConfig";
    pub const SET_SERVER_CONFIG: &str = "setServerConfig";
    pub const GET_MEDIA_LIST: &str = "getMediaList";
    pub const ADD_STREAM_PROXY: &str = "addStreamProxy";

    pub fn method(base: &str, method: &str) -> String {
        format!("{}/index/api/{}", base.trim_end_matches('/'), method)
    }
}
