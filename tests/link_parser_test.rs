//! Tests for link classification and normalization.

use cloud_gallery::link_parser::{parse, provider_display, provider_name, try_parse, validate};
use cloud_gallery::{LinkError, ParsedLink, Provider};

const DRIVE_ID: &str = "1A2B3C4D5E6F7G8H9I0J1K2L3M4N5O6P";

mod dropbox_links {
    use super::*;

    #[test]
    fn basic_shared_folder() {
        let link = parse("https://www.dropbox.com/scl/fo/abc123/h?dl=0").unwrap();
        assert_eq!(link.provider, Provider::Dropbox);
        assert_eq!(link.id, "abc123");
        assert_eq!(link.normalized, "https://www.dropbox.com/scl/fo/abc123/h");
        assert_eq!(link.original_url, "https://www.dropbox.com/scl/fo/abc123/h?dl=0");
    }

    #[test]
    fn dl_flag_does_not_change_identity() {
        let a = parse("https://www.dropbox.com/scl/fo/abc123/h?dl=0").unwrap();
        let b = parse("https://www.dropbox.com/scl/fo/abc123/h?dl=1").unwrap();
        assert_eq!(a.id, "abc123");
        assert_eq!(a.id, b.id);
        assert_eq!(a.normalized, b.normalized);
        assert_ne!(a.original_url, b.original_url);
    }

    #[test]
    fn other_query_params_are_kept() {
        let link =
            parse("https://www.dropbox.com/scl/fo/abc123/listing?rlkey=k9x&dl=0&st=q1").unwrap();
        assert_eq!(
            link.normalized,
            "https://www.dropbox.com/scl/fo/abc123/listing?rlkey=k9x&st=q1"
        );
    }

    #[test]
    fn link_without_query() {
        let link = parse("https://www.dropbox.com/scl/fo/abc123/h").unwrap();
        assert_eq!(link.normalized, "https://www.dropbox.com/scl/fo/abc123/h");
    }

    #[test]
    fn missing_id_segment() {
        assert!(parse("https://www.dropbox.com/scl/fo/").is_none());
        assert!(matches!(
            try_parse("https://www.dropbox.com/scl/fo/"),
            Err(LinkError::Malformed {
                provider: Provider::Dropbox,
                ..
            })
        ));
    }

    #[test]
    fn other_dropbox_hosts_are_unsupported() {
        assert!(parse("https://dropbox.com/scl/fo/abc123/h?dl=0").is_none());
        assert!(parse("https://www.dropbox.com/sh/abc123/xyz?dl=0").is_none());
    }
}

mod drive_links {
    use super::*;

    #[test]
    fn folder_with_sharing_param() {
        let link = parse(&format!(
            "https://drive.google.com/drive/folders/{DRIVE_ID}?usp=sharing"
        ))
        .unwrap();
        assert_eq!(link.provider, Provider::Gdrive);
        assert_eq!(link.id, DRIVE_ID);
        assert_eq!(
            link.normalized,
            format!("https://drive.google.com/drive/folders/{DRIVE_ID}")
        );
    }

    #[test]
    fn resource_key_is_dropped() {
        let a = parse(&format!(
            "https://drive.google.com/drive/folders/{DRIVE_ID}?resourcekey=0-abc&usp=drive_link"
        ))
        .unwrap();
        let b = parse(&format!("https://drive.google.com/drive/folders/{DRIVE_ID}")).unwrap();
        assert_eq!(a.normalized, b.normalized);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn short_id_is_rejected() {
        assert!(parse("https://drive.google.com/drive/folders/short").is_none());
    }

    #[test]
    fn id_of_exactly_twenty_chars() {
        let id = "abcdefghij0123456789";
        let link = parse(&format!("https://drive.google.com/drive/folders/{id}")).unwrap();
        assert_eq!(link.id, id);
        assert!(parse("https://drive.google.com/drive/folders/abcdefghij012345678").is_none());
    }

    #[test]
    fn file_links_are_unsupported() {
        assert!(parse(&format!("https://drive.google.com/file/d/{DRIVE_ID}/view")).is_none());
    }
}

mod local_paths {
    use super::*;

    #[test]
    fn absolute_path() {
        let link = parse("/Users/me/Pictures/listing42").unwrap();
        assert_eq!(link.provider, Provider::Local);
        assert_eq!(link.normalized, "/Users/me/Pictures/listing42");
        assert_eq!(link.id, link.normalized);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let link = parse("  /photos/listing42\n").unwrap();
        assert_eq!(link.provider, Provider::Local);
        assert_eq!(link.normalized, "/photos/listing42");
        assert_eq!(link.original_url, "  /photos/listing42\n");

        let link = parse(" https://www.dropbox.com/scl/fo/abc123/h?dl=0 ").unwrap();
        assert_eq!(link.provider, Provider::Dropbox);
        assert_eq!(link.id, "abc123");
    }

    #[test]
    fn dot_segments_are_collapsed() {
        let link = parse("/Users/me/./Pictures/../Photos/listing42/").unwrap();
        assert_eq!(link.normalized, "/Users/me/Photos/listing42");
    }

    #[test]
    fn relative_path_resolves_against_cwd() {
        let link = parse("../listing42").unwrap();
        let cwd = std::env::current_dir().unwrap();
        let expected = cwd.parent().unwrap_or(&cwd).join("listing42");
        assert_eq!(link.normalized, expected.to_string_lossy());
    }
}

mod invalid_inputs {
    use super::*;

    #[test]
    fn empty_string() {
        assert!(parse("").is_none());
        assert_eq!(try_parse(""), Err(LinkError::Empty));
    }

    #[test]
    fn whitespace_only() {
        assert!(parse("   ").is_none());
        assert!(parse("\t\n").is_none());
    }

    #[test]
    fn unsupported_host() {
        assert!(parse("https://example.com/folder/123").is_none());
        assert!(matches!(
            try_parse("https://example.com/folder/123"),
            Err(LinkError::Unrecognized(_))
        ));
    }

    #[test]
    fn not_a_url() {
        assert!(parse("listing42").is_none());
        assert!(parse("photos from the shoot").is_none());
    }
}

mod idempotence {
    use super::*;

    #[test]
    fn reparsing_yields_equal_links() {
        let inputs = [
            "https://www.dropbox.com/scl/fo/abc123/h?rlkey=z&dl=0".to_string(),
            format!("https://drive.google.com/drive/folders/{DRIVE_ID}?usp=sharing"),
            "/srv/shoots/./2024/../2025/oak-street".to_string(),
        ];
        for input in &inputs {
            assert_eq!(parse(input), parse(input), "{input}");
        }
    }

    #[test]
    fn normalized_form_parses_to_same_identity() {
        let first = parse("https://www.dropbox.com/scl/fo/abc123/h?dl=1").unwrap();
        let second = parse(&first.normalized).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.normalized, second.normalized);
    }
}

mod validation {
    use super::*;

    fn link(provider: Provider, normalized: &str, id: &str) -> ParsedLink {
        ParsedLink {
            provider,
            normalized: normalized.to_string(),
            id: id.to_string(),
            original_url: normalized.to_string(),
        }
    }

    #[test]
    fn parsed_links_validate() {
        for input in [
            "https://www.dropbox.com/scl/fo/abc123/h?dl=0".to_string(),
            format!("https://drive.google.com/drive/folders/{DRIVE_ID}"),
            "/Users/me/Pictures".to_string(),
        ] {
            assert!(validate(&parse(&input).unwrap()), "{input}");
        }
    }

    #[test]
    fn dropbox_without_id() {
        let l = link(Provider::Dropbox, "https://www.dropbox.com/scl/fo/abc/h", "");
        assert!(!validate(&l));
    }

    #[test]
    fn wrong_host_for_provider() {
        let l = link(Provider::Gdrive, "https://example.com/drive/folders/x", DRIVE_ID);
        assert!(!validate(&l));
        let l = link(Provider::Dropbox, "https://example.com/scl/fo/abc", "abc");
        assert!(!validate(&l));
    }

    #[test]
    fn empty_normalized() {
        assert!(!validate(&link(Provider::Local, "", "/tmp")));
        assert!(!validate(&link(Provider::Local, "/tmp", "")));
        assert!(validate(&link(Provider::Local, "/tmp", "/tmp")));
    }
}

mod display {
    use super::*;

    #[test]
    fn known_providers() {
        assert_eq!(provider_name("dropbox"), "Dropbox");
        assert_eq!(provider_name("gdrive"), "Google Drive");
        assert_eq!(provider_name("local"), "Local Folder");
        assert_eq!(provider_display("dropbox").color, "#0061FF");
        assert_eq!(provider_display("local").icon, "folder");
    }

    #[test]
    fn unknown_provider_falls_back() {
        let display = provider_display("onedrive");
        assert_eq!(display.name, "Unknown");
        assert_eq!(provider_name("DROPBOX"), "Unknown");
    }

    #[test]
    fn parsed_link_serializes_camel_case() {
        let link = parse("https://www.dropbox.com/scl/fo/abc123/h?dl=0").unwrap();
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["provider"], "dropbox");
        assert_eq!(json["originalUrl"], "https://www.dropbox.com/scl/fo/abc123/h?dl=0");
    }
}
