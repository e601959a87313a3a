use gac_engine::io;

fn main() {
    io::main();
}
