//! Jekyll build specifications
//!
//! The blog sources live under `blog/` in the repository; the generator and
//! its dependency lock are installed at a pinned version and the production
//! build lands in `blog/_site`.

use siteflow_core::buildspec::{ArtifactSpec, BuildSpec};

const GENERATOR_VERSION: &str = "4.2.2";

/// Buildspec for the site generation stage
pub fn build_spec() -> BuildSpec {
    BuildSpec::new()
        .install_command("cd blog")
        .install_command(&format!("gem install jekyll bundler -v {GENERATOR_VERSION}"))
        .install_command("bundle install")
        .build_command("JEKYLL_ENV=production bundle exec jekyll build")
        .artifacts(ArtifactSpec {
            files: vec!["**/*".to_string()],
            base_directory: Some("blog/_site".to_string()),
            name: Some("jekyll-static-blog-$(date +%Y-%m-%d)".to_string()),
        })
}

/// Buildspec for the cache-invalidation stage
///
/// The distribution id arrives through the project environment, so the
/// buildspec itself is static.
pub fn invalidation_spec() -> BuildSpec {
    BuildSpec::new().build_command(
        "aws cloudfront create-invalidation --distribution-id \"$DISTRIBUTION_ID\" --paths '/*'",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_spec_pins_generator_and_builds_production() {
        let value = build_spec().to_value();
        let install = value["phases"]["install"]["commands"].as_array().unwrap();
        assert_eq!(install[0], "cd blog");
        assert_eq!(install[1], "gem install jekyll bundler -v 4.2.2");
        assert_eq!(install[2], "bundle install");
        assert_eq!(
            value["phases"]["build"]["commands"][0],
            "JEKYLL_ENV=production bundle exec jekyll build"
        );
        assert_eq!(value["artifacts"]["base-directory"], "blog/_site");
        assert_eq!(value["artifacts"]["name"], "jekyll-static-blog-$(date +%Y-%m-%d)");
    }

    #[test]
    fn test_invalidation_spec_purges_everything() {
        let value = invalidation_spec().to_value();
        let command = value["phases"]["build"]["commands"][0].as_str().unwrap();
        assert!(command.contains("create-invalidation"));
        assert!(command.contains("--paths '/*'"));
        assert!(command.contains("$DISTRIBUTION_ID"));
    }
}
