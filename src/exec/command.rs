use std::str::FromStr;

/// Strips whitespace, commas and semicolons from a user-supplied value.
/// The command string is handed to a shell, so the usual separators must
/// never survive into it.
pub fn sanitize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != ';')
        .collect()
}

/// Renders the fixed genotyper invocation. The returned string doubles as
/// the store key: identical inputs always produce an identical command.
/// Whether the locus exists or the BAM is reachable is not checked here.
pub fn build_command(bam: &str, tred: &str, genome_build: &str) -> String {
    format!(
        "tred.py {} --tred {} --ref {}",
        sanitize(bam),
        sanitize(tred),
        sanitize(genome_build)
    )
}

/// Deployment flavor. The two flavors run different Docker images and
/// differ in how much failure detail they expose: the public demo hides
/// internal error text behind a fixed message.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum RunEnv {
    Internal,
    Public,
}

impl RunEnv {
    pub fn image(&self) -> &'static str {
        match self {
            RunEnv::Internal => "tanghaibao/tredparse",
            RunEnv::Public => "tanghaibao/tredparse-public",
        }
    }

    pub fn failure_message(&self, detail: &str) -> String {
        match self {
            RunEnv::Internal => detail.to_string(),
            RunEnv::Public => "TREDPARSE command failed!".to_string(),
        }
    }
}

impl FromStr for RunEnv {
    type Err = &'static str;

    fn from_str(env: &str) -> Result<Self, Self::Err> {
        match env {
            "internal" => Ok(RunEnv::Internal),
            "public" => Ok(RunEnv::Public),
            _ => Err("Invalid environment"),
        }
    }
}

/// Execution settings passed explicitly into the executor instead of read
/// from an ambient global.
#[derive(Debug, Clone, Copy)]
pub struct ExecConfig {
    pub env: RunEnv,
    pub use_docker: bool,
}

impl ExecConfig {
    pub fn new(env: RunEnv, use_docker: bool) -> Self {
        Self { env, use_docker }
    }

    /// The full shell command for a store key. The key itself stays stable
    /// across deployment flavors; only the wrapper changes.
    pub fn shell_command(&self, key: &str) -> String {
        if self.use_docker {
            format!("docker run --rm {} {}", self.env.image(), key)
        } else {
            key.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_separators() {
        assert_eq!(sanitize("a b\tc"), "abc");
        assert_eq!(sanitize("x,y;z"), "xyz");
        assert_eq!(sanitize("rm -rf /; echo"), "rm-rf/echo");
        assert_eq!(sanitize("clean"), "clean");
    }

    #[test]
    fn test_build_command_template() {
        assert_eq!(
            build_command("s3://bucket/sample.bam", "HD", "hg38"),
            "tred.py s3://bucket/sample.bam --tred HD --ref hg38"
        );
    }

    #[test]
    fn test_build_command_deterministic() {
        let a = build_command("@176449128", "DM1", "hg19");
        let b = build_command("@176449128", "DM1", "hg19");
        assert_eq!(a, b);
    }

    #[test]
    fn test_build_command_sanitizes_each_input() {
        let cmd = build_command("bad bam; rm", "HD,SCA17", "hg 38");
        assert!(!cmd.contains(';'));
        assert!(!cmd.contains(','));
        // Only the template separators remain.
        assert_eq!(cmd, "tred.py badbamrm --tred HDSCA17 --ref hg38");
    }

    #[test]
    fn test_run_env() {
        assert_eq!("internal".parse::<RunEnv>().unwrap(), RunEnv::Internal);
        assert_eq!("public".parse::<RunEnv>().unwrap(), RunEnv::Public);
        assert!("staging".parse::<RunEnv>().is_err());
        assert_eq!(
            RunEnv::Public.failure_message("exec error: boom"),
            "TREDPARSE command failed!"
        );
        assert_eq!(
            RunEnv::Internal.failure_message("exec error: boom"),
            "exec error: boom"
        );
    }

    #[test]
    fn test_shell_command_wrapping() {
        let key = build_command("sample.bam", "HD", "hg38");
        let docker = ExecConfig::new(RunEnv::Internal, true);
        assert_eq!(
            docker.shell_command(&key),
            "docker run --rm tanghaibao/tredparse tred.py sample.bam --tred HD --ref hg38"
        );
        let local = ExecConfig::new(RunEnv::Internal, false);
        assert_eq!(local.shell_command(&key), key);
    }
}
