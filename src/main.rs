mod app;

use crate::app::App;

fn main() -> anyhow::Result<()> {
    App::init()?.execute()
}
