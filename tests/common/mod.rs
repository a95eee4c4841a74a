#![allow(dead_code)]

use std::io::Write;

use httpmock::MockServer;
use service_request::config::ConfigLoader;
use service_request::ServicesSetting;
use tempfile::{Builder, TempPath};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn create_file(suffix: &str, contents: &str) -> TempPath {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    writeln!(file, "{}", contents).unwrap();
    file.into_temp_path()
}

/// Writes a services file pointing the `blog` service at `server` and loads it back.
pub fn blog_settings(server: &MockServer) -> ServicesSetting {
    init_logger();
    let config_file = create_file(
        ".yaml",
        &format!(
            "\
services:
  blog:
    end_point: http://{host}
    port: {port}
    end_point_suffix: /api/v1
    headers:
      Accept: application/json
",
            host = server.host(),
            port = server.port()
        ),
    );

    ConfigLoader::settings()
        .with_default(&config_file)
        .load()
        .unwrap()
}
