use lgit_testing::make_git;
use lgit_testing::pty::{run_in_pty, PtyAction, CARRIAGE_RETURN, DOWN_ARROW};

#[test]
fn test_diff_file_nothing_to_diff() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.commit_file("test1", 1)?;
    git.write_file_txt("test1", "changed\n")?;
    git.run(&["add", "test1.txt"])?;

    let (stdout, _stderr) = git.lgit("diff-file", &[])?;
    insta::assert_snapshot!(stdout, @r###"
    Nothing to diff
    "###);

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_diff_file_shows_diff() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.commit_file("test1", 1)?;
    git.commit_file("test2", 2)?;
    git.write_file_txt("test1", "first change\n")?;
    git.write_file_txt("test2", "second change\n")?;

    let exit_code = run_in_pty(
        &git,
        "diff-file",
        &[],
        &[
            PtyAction::WaitUntilContains("Which file do you want to diff?"),
            PtyAction::Write(DOWN_ARROW),
            PtyAction::Write(CARRIAGE_RETURN),
            PtyAction::WaitUntilContains("+second change"),
        ],
    )?;
    assert_eq!(exit_code, 0);

    Ok(())
}
