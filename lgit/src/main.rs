fn main() {
    lgit::commands::main()
}
