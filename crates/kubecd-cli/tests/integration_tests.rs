//! Integration tests for CLI commands

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn kubecd_command(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kubecd"));
    cmd.args(args).env_remove("RUST_LOG");
    cmd
}

/// Helper to run kubecd with its inspect cache rooted in `cache_root`
fn kubecd(cache_root: &Path, args: &[&str]) -> std::process::Output {
    kubecd_command(args)
        .env("KUBECD_CACHE", cache_root)
        .output()
        .expect("Failed to execute kubecd")
}

/// Install a shell script named `name` printing `body` into `bin`
#[cfg(unix)]
fn fake_tool(bin: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(bin).unwrap();
    let path = bin.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// `PATH` with `bin` searched first
#[cfg(unix)]
fn path_with(bin: &Path) -> std::ffi::OsString {
    let mut dirs = vec![bin.to_path_buf()];
    if let Some(path) = std::env::var_os("PATH") {
        dirs.extend(std::env::split_paths(&path));
    }
    std::env::join_paths(dirs).unwrap()
}

const ENV_YAML: &str = r#"
name: prod
kubeNamespace: web
helmRepos:
  - name: stable
    url: https://charts.example.com/stable
defaultValues:
  - key: region
    value: eu
releases:
  - name: app
    chart:
      dir: charts/app
    valuesFile: values/app.yaml
    values:
      - key: image.tag
        value: v2
  - name: config
    resourceFiles:
      - manifests/config.yaml
"#;

/// An environment with a local chart, a values file and a manifest release
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fx = Self {
            dir: TempDir::new().unwrap(),
        };
        fx.write("env.yaml", ENV_YAML);
        fx.write("charts/app/values.yaml", "region: us\nreplicas: 3\nimage:\n  repository: nginx\n  tag: v1\n");
        fx.write("values/app.yaml", "ingress:\n  enabled: true\n");
        fx.write("manifests/config.yaml", "apiVersion: v1\nkind: ConfigMap\n");
        fx
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn env_file(&self) -> String {
        self.path("env.yaml").display().to_string()
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    fn run(&self, args: &[&str]) -> std::process::Output {
        kubecd(&self.path("cache"), args)
    }
}

mod values_command {
    use super::*;

    #[test]
    fn test_values_yaml_output() {
        let fx = Fixture::new();
        let output = fx.run(&["values", &fx.env_file(), "app"]);

        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        let values: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();

        assert_eq!(values["region"], "eu");
        assert_eq!(values["replicas"], 3);
        assert_eq!(values["image"]["repository"], "nginx");
        assert_eq!(values["image"]["tag"], "v2");
        assert_eq!(values["ingress"]["enabled"], true);
    }

    #[test]
    fn test_values_json_output() {
        let fx = Fixture::new();
        let output = fx.run(&["values", &fx.env_file(), "app", "--output", "json"]);

        assert!(output.status.success());
        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
        assert_eq!(json["image"]["tag"], "v2");
        assert_eq!(json["region"], "eu");
    }

    #[test]
    fn test_values_single_key() {
        let fx = Fixture::new();

        let output = fx.run(&["values", &fx.env_file(), "app", "--key", "image.tag"]);
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "v2\n");

        let output = fx.run(&["values", &fx.env_file(), "app", "--key", "image", "-o", "json"]);
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json, serde_json::json!({"repository": "nginx", "tag": "v2"}));
    }

    #[test]
    fn test_values_unknown_key() {
        let fx = Fixture::new();
        let output = fx.run(&["values", &fx.env_file(), "app", "--key", "image.digest"]);

        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("image.digest"));
    }

    #[test]
    fn test_values_unknown_release() {
        let fx = Fixture::new();
        let output = fx.run(&["values", &fx.env_file(), "nope"]);

        assert_eq!(output.status.code(), Some(2));
        assert!(String::from_utf8_lossy(&output.stderr).contains("nope"));
    }

    #[test]
    fn test_values_missing_env_file() {
        let fx = Fixture::new();
        let missing = fx.path("missing.yaml").display().to_string();
        let output = fx.run(&["values", &missing, "app"]);

        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_values_unparseable_values_file() {
        let fx = Fixture::new();
        fx.write("values/app.yaml", "ingress: [unclosed\n");
        let output = fx.run(&["values", &fx.env_file(), "app"]);

        assert_eq!(output.status.code(), Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_values_resolves_value_from() {
        let fx = Fixture::new();
        fx.write(
            "gke.yaml",
            r#"
name: prod
cluster:
  name: prod-cluster
  provider:
    gke:
      project: my-project
      zone: europe-west1-b
defaultValues:
  - key: ingress.ip
    value: placeholder
    valueFrom:
      gceResource:
        address:
          name: prod-ip
releases:
  - name: app
    chart:
      dir: charts/app
"#,
        );
        let env_file = fx.path("gke.yaml").display().to_string();
        let bin = fx.path("bin");
        // prints the address only for the expected lookup
        fake_tool(
            &bin,
            "gcloud",
            r#"[ "$*" = "compute addresses describe prod-ip --format value(address) --project my-project --region europe-west1" ] && echo 35.1.2.3"#,
        );

        let output = kubecd_command(&["values", &env_file, "app", "--key", "ingress.ip"])
            .env("KUBECD_CACHE", fx.path("cache"))
            .env("PATH", path_with(&bin))
            .output()
            .unwrap();
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        assert_eq!(String::from_utf8_lossy(&output.stdout), "35.1.2.3\n");

        let output = fx.run(&["values", &env_file, "app", "--skip-value-from", "--key", "ingress.ip"]);
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "placeholder\n");
    }

    #[test]
    fn test_values_release_without_chart() {
        let fx = Fixture::new();
        let output = fx.run(&["values", &fx.env_file(), "config", "-o", "json"]);

        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json, serde_json::json!({"region": "eu"}));
    }
}

mod inspect_command {
    use super::*;

    #[test]
    fn test_inspect_reads_cached_entry() {
        let fx = Fixture::new();
        // sha1("ab" + "c")
        fx.write(
            "cache/.kubecd/cache/inspect/a9993e364706816aba3e25717850c26c9cd0d89d",
            "replicaCount: 1\n",
        );

        let output = fx.run(&["inspect", "ab", "--version", "c"]);
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        assert_eq!(String::from_utf8_lossy(&output.stdout), "replicaCount: 1\n");
    }

    #[test]
    fn test_inspect_cache_dir_flag_overrides_env() {
        let fx = Fixture::new();
        fx.write(
            "other/.kubecd/cache/inspect/a9993e364706816aba3e25717850c26c9cd0d89d",
            "from: flag\n",
        );
        let other = fx.path("other").display().to_string();

        let output = fx.run(&["--cache-dir", &other, "inspect", "ab", "--version", "c"]);
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "from: flag\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_inspect_cache_miss_runs_helm_once() {
        let fx = Fixture::new();
        let bin = fx.path("bin");
        fake_tool(&bin, "helm", r#"[ "$1 $2" = "inspect values" ] && echo "chart: $3@$5""#);

        let inspect = || {
            kubecd_command(&["inspect", "stable/web", "--version", "1.0.0"])
                .env("KUBECD_CACHE", fx.path("cache"))
                .env("PATH", path_with(&bin))
                .output()
                .unwrap()
        };

        let output = inspect();
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        assert_eq!(String::from_utf8_lossy(&output.stdout), "chart: stable/web@1.0.0\n");

        let entries: Vec<_> = std::fs::read_dir(fx.path("cache/.kubecd/cache/inspect"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);

        // served from the cache once helm is gone
        std::fs::remove_file(bin.join("helm")).unwrap();
        let output = inspect();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "chart: stable/web@1.0.0\n");
    }
}

mod cache_location {
    use super::*;

    #[test]
    fn test_empty_cache_variable_falls_back_to_home() {
        let fx = Fixture::new();
        fx.write(
            "home/.kubecd/cache/inspect/a9993e364706816aba3e25717850c26c9cd0d89d",
            "from: home\n",
        );

        let output = kubecd_command(&["inspect", "ab", "--version", "c"])
            .env("KUBECD_CACHE", "")
            .env("HOME", fx.path("home"))
            .output()
            .unwrap();
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        assert_eq!(String::from_utf8_lossy(&output.stdout), "from: home\n");

        let env_file = fx.env_file();
        for args in [vec!["values", env_file.as_str(), "app"], vec!["commands", env_file.as_str()]] {
            let output = kubecd_command(&args)
                .env("KUBECD_CACHE", "")
                .env("HOME", fx.path("home"))
                .output()
                .unwrap();
            assert!(output.status.success(), "{args:?}: {}", String::from_utf8_lossy(&output.stderr));
        }
    }
}

mod commands_command {
    use super::*;

    fn lines(output: &std::process::Output) -> Vec<String> {
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.starts_with('#'))
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_deploy_commands() {
        let fx = Fixture::new();
        let output = fx.run(&["commands", &fx.env_file()]);

        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        let lines = lines(&output);
        assert_eq!(lines.len(), 2);

        let chart_dir = fx.path("charts/app").display().to_string();
        let values_file = fx.path("values/app.yaml").display().to_string();
        assert_eq!(
            lines[0],
            format!(
                "helm --kube-context env:prod upgrade app {chart_dir} -i --namespace web \
                 --set-string region=eu --values {values_file} --set-string image.tag=v2"
            )
        );

        let manifest = fx.path("manifests/config.yaml").display().to_string();
        assert_eq!(lines[1], format!("kubectl --context env:prod apply -f {manifest}"));
    }

    #[test]
    fn test_deploy_commands_for_selected_release() {
        let fx = Fixture::new();
        let output = fx.run(&["commands", &fx.env_file(), "--release", "config", "--dry-run"]);

        assert!(output.status.success());
        let lines = lines(&output);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("kubectl --context env:prod apply --dry-run -f "));
    }

    #[test]
    fn test_helm_flags() {
        let fx = Fixture::new();
        let output = fx.run(&["commands", &fx.env_file(), "-r", "app", "--dry-run", "--debug-helm"]);

        let lines = lines(&output);
        assert!(lines[0].ends_with("--dry-run --debug"));
    }

    #[test]
    fn test_setup_and_diff() {
        let fx = Fixture::new();
        let output = fx.run(&["commands", &fx.env_file(), "--setup", "--diff"]);

        assert!(output.status.success());
        let lines = lines(&output);
        assert_eq!(lines[0], "helm repo add stable https://charts.example.com/stable");
        assert_eq!(lines[1], "helm repo update");
        assert_eq!(lines[2], "kubectl config use-context env:prod");
        assert!(lines[3].starts_with("helm --kube-context env:prod diff upgrade app "));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_unknown_release() {
        let fx = Fixture::new();

        let output = fx.run(&["commands", &fx.env_file(), "--release", "nope"]);
        assert_eq!(output.status.code(), Some(2));

        let output = fx.run(&["commands", &fx.env_file(), "--release", "nope", "--diff"]);
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_missing_chart_dir() {
        let fx = Fixture::new();
        std::fs::remove_dir_all(fx.path("charts")).unwrap();

        let output = fx.run(&["commands", &fx.env_file()]);
        assert_eq!(output.status.code(), Some(2));
    }
}

mod help {
    use super::*;

    #[test]
    fn test_version_flag() {
        let dir = TempDir::new().unwrap();
        let output = kubecd(dir.path(), &["--version"]);

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).starts_with("kubecd "));
    }

    #[test]
    fn test_help_lists_commands() {
        let dir = TempDir::new().unwrap();
        let output = kubecd(dir.path(), &["--help"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("values"));
        assert!(stdout.contains("inspect"));
        assert!(stdout.contains("commands"));
    }
}
