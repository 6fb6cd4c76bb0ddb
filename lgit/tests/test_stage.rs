use lgit_testing::pty::{run_in_pty, PtyAction, CARRIAGE_RETURN, DOWN_ARROW, ESCAPE};
use lgit_testing::{make_git, GitRunOptions};

#[test]
fn test_stage_nothing_to_add() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;

    let (stdout, _stderr) = git.lgit("add", &[])?;
    insta::assert_snapshot!(stdout, @r###"
    Nothing to add
    "###);

    Ok(())
}

#[test]
fn test_stage_requires_terminal() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.write_file_txt("test1", "contents\n")?;

    let (stdout, stderr) = git.lgit_with_options(
        "stage",
        &[],
        &GitRunOptions {
            expected_exit_code: 1,
            ..Default::default()
        },
    )?;
    insta::assert_snapshot!(stdout, @"");
    insta::assert_snapshot!(stderr, @r###"
    Error: lgit needs a terminal to prompt for input.
    "###);
    insta::assert_snapshot!(git.short_status()?, @r###"
    ?? test1.txt
    "###);

    Ok(())
}

#[test]
fn test_stage_piped_input_requires_terminal() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.write_file_txt("test1", "contents\n")?;

    let (_stdout, stderr) = git.lgit_with_options(
        "add",
        &[],
        &GitRunOptions {
            expected_exit_code: 1,
            input: Some(" \r".to_string()),
            ..Default::default()
        },
    )?;
    insta::assert_snapshot!(stderr, @r###"
    Error: lgit needs a terminal to prompt for input.
    "###);
    insta::assert_snapshot!(git.short_status()?, @r###"
    ?? test1.txt
    "###);

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_stage_chosen_files() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.commit_file("test1", 1)?;
    git.write_file_txt("test1", "changed\n")?;
    git.write_file_txt("test2", "contents\n")?;
    git.write_file_txt("test3", "contents\n")?;

    run_in_pty(
        &git,
        "add",
        &[],
        &[
            PtyAction::WaitUntilContains("Which files do you want to stage?"),
            PtyAction::Write(" "),
            PtyAction::Write(DOWN_ARROW),
            PtyAction::Write(DOWN_ARROW),
            PtyAction::Write(" "),
            PtyAction::Write(CARRIAGE_RETURN),
            PtyAction::WaitUntilContains("Changes to be committed"),
        ],
    )?;

    insta::assert_snapshot!(git.short_status()?, @r###"
    M  test1.txt
    A  test3.txt
    ?? test2.txt
    "###);

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_stage_empty_selection_shows_status() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.write_file_txt("test1", "contents\n")?;

    run_in_pty(
        &git,
        "add",
        &[],
        &[
            PtyAction::WaitUntilContains("Which files do you want to stage?"),
            PtyAction::Write(CARRIAGE_RETURN),
            PtyAction::WaitUntilContains("Untracked files"),
        ],
    )?;

    insta::assert_snapshot!(git.short_status()?, @r###"
    ?? test1.txt
    "###);

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_stage_cancelled() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.write_file_txt("test1", "contents\n")?;

    let exit_code = run_in_pty(
        &git,
        "add",
        &[],
        &[
            PtyAction::WaitUntilContains("Which files do you want to stage?"),
            PtyAction::Write(" "),
            PtyAction::Write(ESCAPE),
        ],
    )?;
    assert_eq!(exit_code, 0);

    insta::assert_snapshot!(git.short_status()?, @r###"
    ?? test1.txt
    "###);

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_stage_page_size() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.run(&["config", "lgit.prompt.pageSize", "1"])?;
    git.write_file_txt("test1", "contents\n")?;
    git.write_file_txt("test2", "contents\n")?;
    git.write_file_txt("test3", "contents\n")?;

    run_in_pty(
        &git,
        "add",
        &[],
        &[
            PtyAction::WaitUntilContains("Which files do you want to stage?"),
            PtyAction::WaitUntilContains("test1.txt"),
            PtyAction::AssertNotContains("test2.txt"),
            PtyAction::Write(DOWN_ARROW),
            PtyAction::WaitUntilContains("test2.txt"),
            PtyAction::Write(" "),
            PtyAction::Write(CARRIAGE_RETURN),
            PtyAction::WaitUntilContains("Changes to be committed"),
        ],
    )?;

    insta::assert_snapshot!(git.short_status()?, @r###"
    A  test2.txt
    ?? test1.txt
    ?? test3.txt
    "###);

    Ok(())
}
