/// コーパスセットアップ
///
/// sentimentハンドラーの起動前処理、およびデプロイ時のコーパス取得CLIから呼び出される。
/// コーパスを取得し、ダウンロードが発生した場合は結果をマニフェストとして保存先ディレクトリに記録する。
/// 事前取得済みのコーパスは読み取り専用ディレクトリ（Lambdaレイヤー等）に置かれ得るため、
/// マニフェストの書き出し失敗は起動を止めない。
use tracing::{info, warn};

use crate::domain::Corpus;
use crate::infrastructure::{
    provision_corpora, CorpusConfig, CorpusProvisionError, CorpusProvisioner, ProvisionManifest,
    ProvisionOutcome, ProvisionedCorpus,
};

/// コーパスを取得し、必要であればマニフェストを書き出す
///
/// 全てのコーパスが取得済みだった場合はマニフェストを書き出さない。
/// マニフェストの書き出しに失敗した場合は警告を出して続行する。
///
/// # 引数
/// * `provisioner` - コーパス取得の実装
/// * `config` - 取得設定（マニフェストの書き出し先とURLに使用）
/// * `corpora` - 取得するコーパス
///
/// # 戻り値
/// * `Ok(Vec<ProvisionedCorpus>)` - 各コーパスの取得結果
/// * `Err(CorpusProvisionError)` - 取得のエラー
pub async fn setup_corpora<P>(
    provisioner: &P,
    config: &CorpusConfig,
    corpora: &[Corpus],
) -> Result<Vec<ProvisionedCorpus>, CorpusProvisionError>
where
    P: CorpusProvisioner + ?Sized,
{
    info!(
        corpus_dir = %config.corpus_dir().display(),
        count = corpora.len(),
        "コーパスのセットアップを開始"
    );

    let provisioned = provision_corpora(provisioner, corpora).await?;

    let downloaded = provisioned
        .iter()
        .any(|p| matches!(p.outcome, ProvisionOutcome::Downloaded { .. }));

    if !downloaded {
        info!("全てのコーパスが取得済みのためマニフェストの書き出しを省略");
        return Ok(provisioned);
    }

    if let Err(e) = ProvisionManifest::now(config, &provisioned)
        .write_to(config.corpus_dir())
        .await
    {
        warn!(error = %e, "マニフェストの書き出しに失敗したが続行");
    }

    Ok(provisioned)
}
