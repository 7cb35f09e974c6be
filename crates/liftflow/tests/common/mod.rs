use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const PROJECT: &str = r#"
project "space-game"

provider "aws" {
    region "us-west-2"
}

fleet "game" {
    build-id "build-1234"
    ec2-instance-type "c5.large"
    inbound-permission from-port=7777 to-port=7780 ip-range="0.0.0.0/0" protocol="UDP"
    runtime-configuration {
        server-process "/local/game/server" concurrent-executions=2
    }
}

alias "live" {
    routing-strategy "SIMPLE" {
        fleet "game"
    }
}
"#;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_project_kdl(&self, content: &str) {
        fs::write(self.root.path().join("liftflow.kdl"), content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// `liftflow` running inside the project, isolated from the caller's
    /// environment and AWS configuration
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("liftflow").unwrap();
        cmd.current_dir(self.path())
            .env_remove("LIFTFLOW_CONFIG_PATH")
            .env_remove("LIFTFLOW_AUTO_APPROVE")
            .env("XDG_CONFIG_HOME", self.path().join("xdg"))
            .env("NO_COLOR", "1")
            .env("AWS_EC2_METADATA_DISABLED", "true")
            .env("AWS_ACCESS_KEY_ID", "test")
            .env("AWS_SECRET_ACCESS_KEY", "test");
        cmd
    }
}
