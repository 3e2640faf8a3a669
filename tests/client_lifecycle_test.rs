/// End-to-end tests for the job lifecycle of `RemoteJobClient`
///
/// Every test drives the client against a scripted server, so these cover
/// the submit/poll/download state machine, transport retries, and the
/// filesystem state left behind.
mod common;

use colabmsa::msa::{RemoteJobClient, TransportError};
use colabmsa::{ColabMsaError, JobStatus};
use common::{instant_config, result_archive, ticket, write_file, Call, ScriptedTransport};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const ALIGNMENT: &str = ">101\nMKTAYIAKQR\n>UniRef100_P12345\t150\t0.990\t1.0E-50\nMKTAYIAKQR\n";

struct Workspace {
    _dir: TempDir,
    folder: PathBuf,
    final_path: PathBuf,
}

fn workspace() -> Workspace {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let folder = dir.path().join("mmseqs");
    let final_path = dir.path().join("final").join("P12345_mmseqs2_hits.a3m");
    Workspace {
        _dir: dir,
        folder,
        final_path,
    }
}

fn client(transport: ScriptedTransport) -> RemoteJobClient<ScriptedTransport> {
    RemoteJobClient::new(transport, &instant_config()).expect("Failed to build client")
}

fn protocol_status(err: ColabMsaError) -> JobStatus {
    match err {
        ColabMsaError::Protocol { status, .. } => status,
        other => panic!("expected a protocol error, got {:?}", other),
    }
}

#[test]
fn test_pending_running_complete_downloads_once() {
    let ws = workspace();
    let client = client(
        ScriptedTransport::new()
            .on_submit(ticket("PENDING", Some("job-1")))
            .on_status(ticket("PENDING", Some("job-1")))
            .on_status(ticket("RUNNING", Some("job-1")))
            .on_status(ticket("COMPLETE", Some("job-1")))
            .on_download(Ok(result_archive(ALIGNMENT))),
    );

    client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap();

    assert_eq!(
        client.transport().calls(),
        vec![
            Call::Submit(">101\nMKTAYIAKQR\n".to_string()),
            Call::Status("job-1".to_string()),
            Call::Status("job-1".to_string()),
            Call::Status("job-1".to_string()),
            Call::Download("job-1".to_string()),
        ]
    );
    assert_eq!(fs::read_to_string(&ws.final_path).unwrap(), ALIGNMENT);
}

#[test]
fn test_no_intermediate_files_remain() {
    let ws = workspace();
    let client = client(
        ScriptedTransport::new()
            .on_submit(ticket("COMPLETE", Some("job-1")))
            .on_download(Ok(result_archive(ALIGNMENT))),
    );

    client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap();

    // A job complete at submission is never polled
    assert_eq!(client.transport().count(|c| matches!(c, Call::Status(_))), 0);
    assert!(!ws.folder.join("out.tar.gz").exists());
    assert!(!ws.folder.join("P12345").exists());
    assert_eq!(fs::read_dir(&ws.folder).unwrap().count(), 0);
}

#[test]
fn test_existing_archive_skips_network() {
    let ws = workspace();
    write_file(&ws.folder.join("out.tar.gz"), &result_archive(ALIGNMENT));
    let client = client(ScriptedTransport::new());

    client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap();

    assert!(client.transport().calls().is_empty());
    assert_eq!(fs::read_to_string(&ws.final_path).unwrap(), ALIGNMENT);
}

#[rstest]
#[case("ERROR", JobStatus::Error)]
#[case("MAINTENANCE", JobStatus::Maintenance)]
fn test_failure_at_submission_is_fatal_without_polling(
    #[case] raw: &str,
    #[case] expected: JobStatus,
) {
    let ws = workspace();
    let client = client(ScriptedTransport::new().on_submit(ticket(raw, Some("job-1"))));

    let err = client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap_err();

    assert_eq!(protocol_status(err), expected);
    assert_eq!(client.transport().calls().len(), 1);
    assert!(!ws.final_path.exists());
}

#[test]
fn test_ratelimit_and_unknown_resubmit_until_accepted() {
    let ws = workspace();
    let client = client(
        ScriptedTransport::new()
            .on_submit(ticket("RATELIMIT", None))
            .on_submit(ticket("UNKNOWN", None))
            .on_submit(ticket("RUNNING", Some("job-7")))
            .on_status(ticket("COMPLETE", Some("job-7")))
            .on_download(Ok(result_archive(ALIGNMENT))),
    );

    client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap();

    let transport = client.transport();
    assert_eq!(transport.count(|c| matches!(c, Call::Submit(_))), 3);
    assert_eq!(transport.count(|c| matches!(c, Call::Download(_))), 1);
}

#[test]
fn test_malformed_submission_reply_is_an_error_status() {
    let ws = workspace();
    let client = client(
        ScriptedTransport::new().on_submit(Ok("<html>502 Bad Gateway</html>".to_string())),
    );

    let err = client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap_err();

    assert_eq!(protocol_status(err), JobStatus::Error);
    assert_eq!(client.transport().calls().len(), 1);
}

#[test]
fn test_malformed_status_reply_stops_before_download() {
    let ws = workspace();
    let client = client(
        ScriptedTransport::new()
            .on_submit(ticket("PENDING", Some("job-1")))
            .on_status(Ok("not json".to_string())),
    );

    let err = client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap_err();

    assert_eq!(protocol_status(err), JobStatus::Error);
    assert_eq!(client.transport().count(|c| matches!(c, Call::Download(_))), 0);
}

#[test]
fn test_maintenance_while_polling_is_fatal() {
    let ws = workspace();
    let client = client(
        ScriptedTransport::new()
            .on_submit(ticket("PENDING", Some("job-1")))
            .on_status(ticket("MAINTENANCE", Some("job-1"))),
    );

    let err = client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap_err();

    assert_eq!(protocol_status(err), JobStatus::Maintenance);
    assert_eq!(client.transport().count(|c| matches!(c, Call::Submit(_))), 1);
}

#[test]
fn test_ratelimit_while_polling_resubmits() {
    let ws = workspace();
    let client = client(
        ScriptedTransport::new()
            .on_submit(ticket("PENDING", Some("job-1")))
            .on_status(ticket("RATELIMIT", Some("job-1")))
            .on_submit(ticket("PENDING", Some("job-2")))
            .on_status(ticket("COMPLETE", Some("job-2")))
            .on_download(Ok(result_archive(ALIGNMENT))),
    );

    client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap();

    assert_eq!(
        client.transport().calls().last(),
        Some(&Call::Download("job-2".to_string()))
    );
}

#[test]
fn test_accepted_job_without_id_is_never_polled() {
    let ws = workspace();
    let client = client(ScriptedTransport::new().on_submit(ticket("PENDING", None)));

    let err = client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap_err();

    assert_eq!(protocol_status(err), JobStatus::Pending);
    assert_eq!(client.transport().count(|c| matches!(c, Call::Status(_))), 0);
}

#[test]
fn test_duplicate_sequences_are_submitted_once() {
    let ws = workspace();
    let client = client(
        ScriptedTransport::new()
            .on_submit(ticket("COMPLETE", Some("job-1")))
            .on_download(Ok(result_archive(ALIGNMENT))),
    );

    client
        .run(&["MKT", "AYI", "MKT", "AYI"], &ws.folder, &ws.final_path, "P12345")
        .unwrap();

    assert_eq!(
        client.transport().calls()[0],
        Call::Submit(">101\nMKT\n>102\nAYI\n".to_string())
    );
}

#[test]
fn test_transient_transport_errors_are_retried() {
    let ws = workspace();
    let client = client(
        ScriptedTransport::new()
            .on_submit(Err(TransportError::Timeout("slow".into())))
            .on_submit(Err(TransportError::Connection("reset".into())))
            .on_submit(ticket("PENDING", Some("job-1")))
            .on_status(Err(TransportError::Timeout("slow".into())))
            .on_status(ticket("COMPLETE", Some("job-1")))
            .on_download(Err(TransportError::Connection("reset".into())))
            .on_download(Ok(result_archive(ALIGNMENT))),
    );

    client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap();

    assert_eq!(client.transport().calls().len(), 7);
    assert!(ws.final_path.exists());
}

#[test]
fn test_exhausted_download_budget_is_fatal() {
    let ws = workspace();
    let mut transport = ScriptedTransport::new()
        .on_submit(ticket("COMPLETE", Some("job-1")));
    for _ in 0..6 {
        transport = transport.on_download(Err(TransportError::Connection("refused".into())));
    }
    let client = client(transport);

    let err = client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap_err();

    assert!(matches!(err, ColabMsaError::Transport(_)), "{:?}", err);
    assert_eq!(client.transport().count(|c| matches!(c, Call::Download(_))), 6);
    assert!(!ws.folder.join("out.tar.gz").exists());
}

#[test]
fn test_archive_without_alignment_member_fails() {
    let ws = workspace();
    let client = client(
        ScriptedTransport::new()
            .on_submit(ticket("COMPLETE", Some("job-1")))
            .on_download(Ok(common::tar_gz(&[("pdb70.m8", "")]))),
    );

    let err = client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap_err();

    assert!(matches!(err, ColabMsaError::Archive(_)), "{:?}", err);
    assert!(!ws.folder.join("out.tar.gz").exists());
    assert!(!ws.folder.join("P12345").exists());
}

#[test]
fn test_error_page_is_never_saved_as_archive() {
    let ws = workspace();
    let client = client(
        ScriptedTransport::new()
            .on_submit(ticket("COMPLETE", Some("job-1")))
            .on_download(Ok(b"<html><body>502 Bad Gateway</body></html>".to_vec())),
    );

    let err = client
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap_err();

    assert!(matches!(err, ColabMsaError::Archive(_)), "{:?}", err);
    assert_eq!(fs::read_dir(&ws.folder).unwrap().count(), 0);
    assert!(!ws.final_path.exists());
}

#[test]
fn test_next_run_downloads_again_after_bad_archive() {
    let ws = workspace();
    write_file(&ws.folder.join("out.tar.gz"), b"<html>Service Unavailable</html>");

    let stale = client(ScriptedTransport::new());
    let err = stale
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap_err();
    assert!(matches!(err, ColabMsaError::Archive(_)), "{:?}", err);
    assert!(stale.transport().calls().is_empty());
    assert!(!ws.folder.join("out.tar.gz").exists());

    let fresh = client(
        ScriptedTransport::new()
            .on_submit(ticket("COMPLETE", Some("job-1")))
            .on_download(Ok(result_archive(ALIGNMENT))),
    );
    fresh
        .run(&["MKTAYIAKQR"], &ws.folder, &ws.final_path, "P12345")
        .unwrap();

    assert_eq!(fresh.transport().count(|c| matches!(c, Call::Download(_))), 1);
    assert_eq!(fs::read_to_string(&ws.final_path).unwrap(), ALIGNMENT);
}

#[test]
fn test_no_sequences_is_rejected() {
    let ws = workspace();
    let client = client(ScriptedTransport::new());

    let err = client
        .run::<&str>(&[], &ws.folder, &ws.final_path, "P12345")
        .unwrap_err();

    assert!(matches!(err, ColabMsaError::Parse(_)));
    assert!(client.transport().calls().is_empty());
}
