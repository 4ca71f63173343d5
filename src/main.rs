fn main() {
    // Optional .env file; real environment variables win.
    dotenvy::dotenv().ok();
    kodomo_navi_lib::run()
}
