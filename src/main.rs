use katamuki::telemetry;
use katamuki::yew_app::App;

fn main() {
    console_error_panic_hook::set_once();
    if cfg!(debug_assertions) {
        telemetry::set_telemetry_hook(Some(telemetry::console_hook()));
    }
    yew::Renderer::<App>::new().render();
}
