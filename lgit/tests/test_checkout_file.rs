use lgit_testing::make_git;
use lgit_testing::pty::{run_in_pty, PtyAction, CARRIAGE_RETURN};

#[test]
fn test_checkout_file_nothing_to_checkout() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    // Untracked files can't be checked out.
    git.write_file_txt("test1", "contents\n")?;

    let (stdout, _stderr) = git.lgit("checkout-file", &[])?;
    insta::assert_snapshot!(stdout, @r###"
    Nothing to checkout
    "###);

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_checkout_file_discards_changes() -> eyre::Result<()> {
    let git = make_git()?;
    git.init_repo()?;
    git.commit_file("test1", 1)?;
    git.commit_file("test2", 2)?;
    git.write_file_txt("test1", "changed\n")?;
    git.write_file_txt("test2", "changed\n")?;

    run_in_pty(
        &git,
        "checkout-file",
        &[],
        &[
            PtyAction::WaitUntilContains("Which files do you want to checkout?"),
            PtyAction::Write(" "),
            PtyAction::Write(CARRIAGE_RETURN),
            PtyAction::WaitUntilContains("Changes not staged for commit"),
        ],
    )?;

    assert_eq!(git.read_file("test1.txt")?, "test1 contents\n");
    assert_eq!(git.read_file("test2.txt")?, "changed\n");

    Ok(())
}
