#[macro_use(
    slog_crit,
    slog_debug,
    slog_error,
    slog_info,
    slog_trace,
    slog_warn,
    slog_log,
    slog_kv,
    slog_record,
    slog_record_static,
    slog_b
)]
extern crate slog;

#[macro_use]
extern crate slog_global;

use std::path::{Path, PathBuf};
use std::process;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use membership::EtcdClient;
use peersync::conf::Conf;
use peersync::conf::ConfError;
use peersync::envfile::EnvFile;
use peersync::envfile::WriteOutcome;
use peersync::setup::init_logger;
use peersync::sync::sync_etcd_peers;
use peersync::SyncError;
use roster::Ec2Metadata;
use roster::FileProvider;
use roster::IdentitySource;
use roster::LocalIdentity;
use roster::RosterFile;

fn main() {
    let matches = App::new("peersync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("manage etcd cluster peers based on autoscaling group members")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("conf")
                .long("conf")
                .short("c")
                .takes_value(true)
                .global(true)
                .help("config in yaml"),
        )
        .arg(
            Arg::with_name("log")
                .long("log")
                .takes_value(true)
                .global(true)
                .help("log file, logs go to stderr if absent"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .global(true)
                .help("log debug messages"),
        )
        .subcommand(
            SubCommand::with_name("sync-etcd-peers")
                .about("syncs etcd cluster members with the roster and writes the etcd peers env file")
                .arg(
                    Arg::with_name("out")
                        .long("out")
                        .short("o")
                        .takes_value(true)
                        .help("etcd peers env file destination [default: /etc/sysconfig/etcd-peers]"),
                )
                .arg(
                    Arg::with_name("roster")
                        .long("roster")
                        .takes_value(true)
                        .help("yaml file mapping member name to address"),
                )
                .arg(
                    Arg::with_name("name")
                        .long("name")
                        .takes_value(true)
                        .requires("address")
                        .help("local member name, instead of the instance metadata"),
                )
                .arg(
                    Arg::with_name("address")
                        .long("address")
                        .takes_value(true)
                        .requires("name")
                        .help("local member address, instead of the instance metadata"),
                )
                .arg(
                    Arg::with_name("ca-file")
                        .long("ca-file")
                        .takes_value(true)
                        .env("ETCDCTL_CA_FILE")
                        .help("CA bundle to verify the cluster with"),
                )
                .arg(
                    Arg::with_name("cert-file")
                        .long("cert-file")
                        .takes_value(true)
                        .env("ETCDCTL_CERT_FILE")
                        .help("client certificate"),
                )
                .arg(
                    Arg::with_name("key-file")
                        .long("key-file")
                        .takes_value(true)
                        .env("ETCDCTL_KEY_FILE")
                        .help("client key"),
                ),
        )
        .get_matches();

    let sub = match matches.subcommand_matches("sync-etcd-peers") {
        Some(sub) => sub,
        None => unreachable!("subcommand is required"),
    };

    // global flags are propagated down to the subcommand
    let level = if sub.is_present("verbose") {
        slog::Level::Debug
    } else {
        slog::Level::Info
    };

    let guard = match init_logger(sub.value_of("log").map(Path::new), level) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to init logger: {}", e);
            process::exit(2);
        }
    };

    let rst = run_sync(sub);

    let code = match rst {
        Ok(WriteOutcome::Written) => {
            info!("done");
            0
        }
        Ok(WriteOutcome::AlreadyPresent) => 0,
        Err(e) => {
            error!("sync-etcd-peers failed"; "err" => %e);
            1
        }
    };

    // flush pending records before exiting
    drop(guard);
    process::exit(code);
}

fn run_sync(sub: &ArgMatches) -> Result<WriteOutcome, SyncError> {
    let conf = load_conf(sub)?;
    debug!("config loaded"; "conf" => ?&conf);

    let env = EnvFile::new(&conf.out, &conf.env_prefix);

    let roster_file = conf.roster_file.as_ref().ok_or_else(|| {
        SyncError::Conf(ConfError::Invalid(
            "roster_file",
            "--roster or roster_file is required".into(),
        ))
    })?;

    // nothing below talks to the network until sync_etcd_peers has checked `env`
    let identity = match (sub.value_of("name"), sub.value_of("address")) {
        (Some(name), Some(addr)) => IdentitySource::Fixed(LocalIdentity::new(name, addr)),
        _ => IdentitySource::Metadata(Ec2Metadata::new(
            &conf.metadata_url,
            conf.metadata_timeout(),
        )?),
    };

    let provider = FileProvider::new(identity, RosterFile::new(roster_file));
    let client = EtcdClient::new(&conf.etcd_conf())?;

    sync_etcd_peers(&provider, &client, &conf.urls(), &env)
}

/// load_conf reads the config file if given and lets command line flags override it.
fn load_conf(sub: &ArgMatches) -> Result<Conf, SyncError> {
    let mut conf = match sub.value_of("conf") {
        Some(p) => Conf::from_file(p)?,
        None => Conf::default(),
    };

    if let Some(v) = sub.value_of("out") {
        conf.out = PathBuf::from(v);
    }
    if let Some(v) = sub.value_of("roster") {
        conf.roster_file = Some(PathBuf::from(v));
    }
    if let Some(v) = sub.value_of("ca-file") {
        conf.tls.ca_file = Some(PathBuf::from(v));
    }
    if let Some(v) = sub.value_of("cert-file") {
        conf.tls.cert_file = Some(PathBuf::from(v));
    }
    if let Some(v) = sub.value_of("key-file") {
        conf.tls.key_file = Some(PathBuf::from(v));
    }

    conf.check()?;
    Ok(conf)
}
