use std::sync::{Arc, Mutex};

use lgit_lib::core::effects::Effects;
use lgit_lib::core::formatting::Glyphs;
use lgit_lib::git::GitRunOpts;
use lgit_lib::util::ExitCode;
use lgit_testing::make_git;

#[test]
fn test_run_forwards_output() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.write_file_txt("test1", "contents\n")?;

    let stdout = Arc::new(Mutex::new(Vec::new()));
    let stderr = Arc::new(Mutex::new(Vec::new()));
    let effects = Effects::new_from_buffer_for_test(Glyphs::text(), &stdout, &stderr);
    let git_run_info = git.get_git_run_info();
    let result = git_run_info.run(&effects, &["status", "--short"])?;
    assert_eq!(result, Ok(()));

    let stdout = String::from_utf8(stdout.lock().unwrap().clone())?;
    insta::assert_snapshot!(stdout, @r###"
    lgit: running command: git status --short
    ?? test1.txt
    "###);

    Ok(())
}

#[test]
fn test_run_propagates_exit_code() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;

    let stdout = Arc::new(Mutex::new(Vec::new()));
    let stderr = Arc::new(Mutex::new(Vec::new()));
    let effects = Effects::new_from_buffer_for_test(Glyphs::text(), &stdout, &stderr);
    let git_run_info = git.get_git_run_info();
    let result = git_run_info.run(&effects, &["checkout", "nonexistent"])?;
    assert_eq!(result, Err(ExitCode(1)));

    let stderr = String::from_utf8(stderr.lock().unwrap().clone())?;
    assert!(stderr.contains("nonexistent"), "stderr was: {stderr}");

    Ok(())
}

#[test]
fn test_run_silent() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;

    let git_run_info = git.get_git_run_info();
    let result = git_run_info.run_silent(
        &["rev-parse", "--abbrev-ref", "HEAD"],
        GitRunOpts::default(),
    )?;
    assert_eq!(String::from_utf8(result.stdout)?, "master\n");

    let result = git_run_info.run_silent(&["rev-parse", "nonexistent"], GitRunOpts::default());
    assert!(result.is_err());

    let result = git_run_info.run_silent(
        &["rev-parse", "--verify", "--quiet", "nonexistent"],
        GitRunOpts {
            treat_git_failure_as_error: false,
            ..Default::default()
        },
    )?;
    assert!(!result.exit_code.is_success());

    Ok(())
}
