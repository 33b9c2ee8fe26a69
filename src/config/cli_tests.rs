//! Tests for CLI argument parsing.

use std::path::PathBuf;

use clap::ValueEnum;

use super::cli::{Cli, Command, FastPathArg, FormatArg};
use super::validated::OutputFormat;
use crate::route::FastPathPolicy;

mod subcommands {
    use super::*;

    #[test]
    fn parse_resolve() {
        let cli = Cli::parse_from_iter(["route-source", "resolve", "93.184.216.34"]);

        match cli.command {
            Command::Resolve { destination } => assert_eq!(destination, "93.184.216.34"),
            other => panic!("Expected Resolve, got {other:?}"),
        }
    }

    #[test]
    fn parse_query_with_scope() {
        let cli = Cli::parse_from_iter([
            "route-source",
            "query",
            "10.8.0.1",
            "--scope",
            "utun3",
            "--no-interface-name",
        ]);

        match cli.command {
            Command::Query {
                destination,
                scope,
                no_interface_name,
            } => {
                assert_eq!(destination, "10.8.0.1");
                assert_eq!(scope.as_deref(), Some("utun3"));
                assert!(no_interface_name);
            }
            other => panic!("Expected Query, got {other:?}"),
        }
    }

    #[test]
    fn parse_query_defaults() {
        let cli = Cli::parse_from_iter(["route-source", "query", "1.1.1.1"]);

        match cli.command {
            Command::Query {
                scope,
                no_interface_name,
                ..
            } => {
                assert_eq!(scope, None);
                assert!(!no_interface_name);
            }
            other => panic!("Expected Query, got {other:?}"),
        }
    }

    #[test]
    fn parse_owns_with_interface() {
        let cli = Cli::parse_from_iter(["route-source", "owns", "10.0.0.5", "-i", "en0"]);

        match cli.command {
            Command::Owns { address, interface } => {
                assert_eq!(address, "10.0.0.5");
                assert_eq!(interface.as_deref(), Some("en0"));
            }
            other => panic!("Expected Owns, got {other:?}"),
        }
    }

    #[test]
    fn parse_init_default_output() {
        let cli = Cli::parse_from_iter(["route-source", "init"]);

        assert!(cli.is_init());
        match cli.command {
            Command::Init { output } => assert_eq!(output, PathBuf::from("route-source.toml")),
            other => panic!("Expected Init, got {other:?}"),
        }
    }

    #[test]
    fn parse_init_custom_output() {
        let cli = Cli::parse_from_iter(["route-source", "init", "--output", "custom.toml"]);

        match cli.command {
            Command::Init { output } => assert_eq!(output, PathBuf::from("custom.toml")),
            other => panic!("Expected Init, got {other:?}"),
        }
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        use clap::Parser;

        let result = Cli::try_parse_from(["route-source"]);

        assert!(result.is_err());
    }

    #[test]
    fn missing_destination_is_rejected() {
        use clap::Parser;

        let result = Cli::try_parse_from(["route-source", "resolve"]);

        assert!(result.is_err());
    }
}

mod global_flags {
    use super::*;

    #[test]
    fn flags_default_to_unset() {
        let cli = Cli::parse_from_iter(["route-source", "resolve", "1.1.1.1"]);

        assert_eq!(cli.config, None);
        assert_eq!(cli.format, None);
        assert_eq!(cli.fast_path, None);
        assert!(!cli.verbose);
        assert!(!cli.is_init());
    }

    #[test]
    fn flags_before_subcommand() {
        let cli = Cli::parse_from_iter([
            "route-source",
            "-v",
            "--config",
            "rs.toml",
            "--format",
            "json",
            "resolve",
            "1.1.1.1",
        ]);

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("rs.toml")));
        assert_eq!(cli.format, Some(FormatArg::Json));
    }

    #[test]
    fn flags_after_subcommand() {
        let cli = Cli::parse_from_iter([
            "route-source",
            "resolve",
            "fe80::1%4",
            "--fast-path",
            "all",
            "-c",
            "rs.toml",
        ]);

        assert_eq!(cli.fast_path, Some(FastPathArg::All));
        assert_eq!(cli.config, Some(PathBuf::from("rs.toml")));
    }

    #[test]
    fn invalid_fast_path_is_rejected() {
        use clap::Parser;

        let result = Cli::try_parse_from(["route-source", "--fast-path", "sometimes", "init"]);

        assert!(result.is_err());
    }
}

mod value_enums {
    use super::*;

    #[test]
    fn fast_path_names() {
        assert_eq!(
            FastPathArg::from_str("ipv4", false).unwrap(),
            FastPathArg::Ipv4,
        );
        assert_eq!(
            FastPathArg::from_str("all", false).unwrap(),
            FastPathArg::All,
        );
        assert_eq!(
            FastPathArg::from_str("off", false).unwrap(),
            FastPathArg::Off,
        );
    }

    #[test]
    fn fast_path_into_policy() {
        assert_eq!(
            FastPathPolicy::from(FastPathArg::Ipv4),
            FastPathPolicy::Ipv4Only,
        );
        assert_eq!(
            FastPathPolicy::from(FastPathArg::All),
            FastPathPolicy::AllFamilies,
        );
        assert_eq!(
            FastPathPolicy::from(FastPathArg::Off),
            FastPathPolicy::Disabled,
        );
    }

    #[test]
    fn format_into_output_format() {
        assert_eq!(OutputFormat::from(FormatArg::Text), OutputFormat::Text);
        assert_eq!(OutputFormat::from(FormatArg::Json), OutputFormat::Json);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(FormatArg::from_str("yaml", false).is_err());
    }
}
